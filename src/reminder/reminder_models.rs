use super::messages;
use crate::{
    common::labels::Language,
    mailer::{MailTemplate, OutgoingMail},
    user::user_models::ReminderProfile,
};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub const BIRTHDAY_LEAD_DAYS: i64 = 4;
pub const PREVIEW_BIRTHDAY_LEAD_DAYS: i64 = 30;
pub const ANNIVERSARY_LEAD_DAYS: i64 = 4;
pub const CONTRACT_LEAD_DAYS: i64 = 8;

/// The day/month of `date` in `year`; 29 February rolls over to 1 March.
pub fn in_year(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, date.month(), date.day()).or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// `today` falls within `lead_days` before `event`, the event day included.
pub fn in_window(today: NaiveDate, event: NaiveDate, lead_days: i64) -> bool {
    today >= event - Duration::days(lead_days) && today <= event
}

/// Weekend events are announced on the Friday before.
pub fn announce_date(event: NaiveDate) -> NaiveDate {
    match event.weekday() {
        Weekday::Sat => event - Duration::days(1),
        Weekday::Sun => event - Duration::days(2),
        _ => event,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BirthdayEntry {
    pub full_name: String,
    pub birthday: NaiveDate,
    pub event: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnniversaryEntry {
    pub full_name: String,
    pub company_joined_date: NaiveDate,
    pub event: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractEntry {
    pub full_name: String,
    pub contract_expiration_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderLists {
    pub birthdays: Vec<BirthdayEntry>,
    pub anniversaries: Vec<AnniversaryEntry>,
    pub contracts: Vec<ContractEntry>,
}

impl ReminderLists {
    pub fn collect(profiles: &[ReminderProfile], today: NaiveDate, birthday_lead_days: i64) -> Self {
        let mut lists = ReminderLists::default();

        for profile in profiles {
            if let Some(birthday) = profile.birthday {
                if let Some(event) = in_year(birthday, today.year()) {
                    if in_window(today, event, birthday_lead_days) {
                        lists.birthdays.push(BirthdayEntry {
                            full_name: profile.full_name.clone(),
                            birthday,
                            event,
                        });
                    }
                }
            }

            if let Some(joined) = profile.company_joined_date {
                if let Some(event) = in_year(joined, today.year()) {
                    if in_window(today, event, ANNIVERSARY_LEAD_DAYS) {
                        lists.anniversaries.push(AnniversaryEntry {
                            full_name: profile.full_name.clone(),
                            company_joined_date: joined,
                            event,
                        });
                    }
                }
            }

            if let Some(expiration) = profile.contract_expiration_date {
                if in_window(today, expiration, CONTRACT_LEAD_DAYS) {
                    lists.contracts.push(ContractEntry {
                        full_name: profile.full_name.clone(),
                        contract_expiration_date: expiration,
                    });
                }
            }
        }

        lists
    }
}

/// Organization facts the reminder mails are written with.
pub struct MailContext<'a> {
    pub organization: &'a str,
    pub org_tag: &'a str,
    pub language: Language,
    pub notice_email: &'a str,
    pub manager_emails: &'a [String],
}

/// Mails due today. Celebrations go out on their announce date, contract
/// reminders every day of their window.
pub fn due_mails(lists: &ReminderLists, today: NaiveDate, ctx: &MailContext<'_>) -> Vec<OutgoingMail> {
    let mut mails = Vec::new();
    let mail = |to: Vec<String>, subject: String, template: MailTemplate, content: String| OutgoingMail {
        to,
        subject,
        template,
        content,
        url: None,
        org_tag: Some(ctx.org_tag.to_string()),
    };

    if !ctx.notice_email.is_empty() {
        for entry in lists.birthdays.iter().filter(|e| announce_date(e.event) == today) {
            mails.push(mail(
                vec![ctx.notice_email.to_string()],
                messages::birthday_subject(&entry.full_name),
                MailTemplate::EventReminder,
                messages::birthday_body(ctx.language, &entry.full_name, ctx.organization),
            ));
        }

        for entry in lists.anniversaries.iter().filter(|e| announce_date(e.event) == today) {
            let years = today.year() - entry.company_joined_date.year();
            mails.push(mail(
                vec![ctx.notice_email.to_string()],
                messages::anniversary_subject(&entry.full_name, ctx.organization),
                MailTemplate::EventReminder,
                messages::anniversary_body(ctx.language, years, &entry.full_name, ctx.organization),
            ));
        }
    }

    if !ctx.manager_emails.is_empty() {
        for entry in &lists.contracts {
            mails.push(mail(
                ctx.manager_emails.to_vec(),
                messages::contract_subject(&entry.full_name),
                MailTemplate::Contract,
                messages::contract_body(&entry.full_name, entry.contract_expiration_date),
            ));
        }
    }

    mails
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn profile(
        name: &str,
        birthday: Option<NaiveDate>,
        joined: Option<NaiveDate>,
        contract: Option<NaiveDate>,
    ) -> ReminderProfile {
        ReminderProfile {
            user_id: 1,
            full_name: name.into(),
            birthday,
            company_joined_date: joined,
            contract_expiration_date: contract,
        }
    }

    #[test]
    fn test_window_includes_both_ends() {
        let event = date(2024, 6, 10);
        assert!(in_window(date(2024, 6, 6), event, 4));
        assert!(in_window(date(2024, 6, 10), event, 4));
        assert!(!in_window(date(2024, 6, 5), event, 4));
        assert!(!in_window(date(2024, 6, 11), event, 4));
    }

    #[test]
    fn test_weekend_events_move_to_friday() {
        // 2024-06-08 is a Saturday.
        assert_eq!(announce_date(date(2024, 6, 8)), date(2024, 6, 7));
        assert_eq!(announce_date(date(2024, 6, 9)), date(2024, 6, 7));
        assert_eq!(announce_date(date(2024, 6, 10)), date(2024, 6, 10));
    }

    #[test]
    fn test_leap_day_rolls_to_march() {
        assert_eq!(in_year(date(2000, 2, 29), 2023), Some(date(2023, 3, 1)));
        assert_eq!(in_year(date(2000, 2, 29), 2024), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_preview_window_is_wider_for_birthdays() {
        let profiles = [profile("An", Some(date(1990, 6, 30)), None, None)];
        let today = date(2024, 6, 10);

        assert!(ReminderLists::collect(&profiles, today, BIRTHDAY_LEAD_DAYS).birthdays.is_empty());
        assert_eq!(ReminderLists::collect(&profiles, today, PREVIEW_BIRTHDAY_LEAD_DAYS).birthdays.len(), 1);
    }

    #[test]
    fn test_contract_window_is_eight_days() {
        let profiles = [profile("Binh", None, None, Some(date(2024, 6, 18)))];
        assert_eq!(ReminderLists::collect(&profiles, date(2024, 6, 10), BIRTHDAY_LEAD_DAYS).contracts.len(), 1);
        assert!(ReminderLists::collect(&profiles, date(2024, 6, 9), BIRTHDAY_LEAD_DAYS).contracts.is_empty());
    }

    #[test]
    fn test_due_mails_follow_announce_date() {
        let profiles = [
            // Birthday on Sunday 2024-06-09, announced Friday 2024-06-07.
            profile("An", Some(date(1990, 6, 9)), None, None),
            profile("Binh", None, Some(date(2020, 6, 7)), Some(date(2024, 6, 12))),
        ];
        let today = date(2024, 6, 7);
        let lists = ReminderLists::collect(&profiles, today, BIRTHDAY_LEAD_DAYS);
        let managers = vec!["gm@example.com".to_string()];
        let ctx = MailContext {
            organization: "Acme",
            org_tag: "acme",
            language: Language::En,
            notice_email: "all@example.com",
            manager_emails: &managers,
        };

        let mails = due_mails(&lists, today, &ctx);
        let subjects: Vec<&str> = mails.iter().map(|m| m.subject.as_str()).collect();
        assert_eq!(
            subjects,
            vec![
                "[All-members] Happy birthday to An!",
                "[All-members] Celebrating day Binh joined Acme company ",
                "[Notification] Contract extension for Binh",
            ]
        );
        assert!(mails[1].content.contains("4-year anniversary"));
        assert_eq!(mails[2].to, managers);
    }

    #[test]
    fn test_no_celebration_mail_without_notice_address() {
        let profiles = [profile("An", Some(date(1990, 6, 10)), None, None)];
        let today = date(2024, 6, 10);
        let lists = ReminderLists::collect(&profiles, today, BIRTHDAY_LEAD_DAYS);
        let ctx = MailContext {
            organization: "Acme",
            org_tag: "acme",
            language: Language::Vn,
            notice_email: "",
            manager_emails: &[],
        };

        assert!(due_mails(&lists, today, &ctx).is_empty());
    }
}
