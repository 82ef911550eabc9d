use crate::common::{dates, labels::Language};
use chrono::NaiveDate;

pub fn birthday_subject(full_name: &str) -> String {
    format!("[All-members] Happy birthday to {}!", full_name)
}

pub fn anniversary_subject(full_name: &str, organization: &str) -> String {
    format!("[All-members] Celebrating day {} joined {} company ", full_name, organization)
}

pub fn contract_subject(full_name: &str) -> String {
    format!("[Notification] Contract extension for {}", full_name)
}

pub fn birthday_body(language: Language, full_name: &str, organization: &str) -> String {
    match language {
        Language::En => format!(
            "Have a nice day!\n\n\
             Happy birthday {}! Everyone at {} wishes you the best for this special day and for the year ahead.\n\n\
             Congratulations, and thank you for your contributions. We’re honoured to have you with us.\n\n\
             Best regards!",
            full_name, organization
        ),
        Language::Vn => format!(
            "Chúc một ngày tốt lành!\n\n\
             Chúc Mừng Sinh Nhật {}! {}\n\
             Chúc bạn tuổi mới nhiều sức khỏe, hạnh phúc, giàu nhiệt huyết để gặt hái thêm nhiều thành công mới trong công việc và cuộc sống.",
            full_name, organization
        ),
        Language::Jp => "お誕生日おめでとうございます。 この1年が素晴らしい年でありますように".to_string(),
    }
}

pub fn anniversary_body(language: Language, years: i32, full_name: &str, organization: &str) -> String {
    match language {
        Language::En => format!(
            "Have a nice day!\n\n\
             Today, we're celebrating {}-year anniversary since {} joined {} company. \
             Congratulations and thanks for your contributions.\n\n\
             We hope together, we can make the company grow bigger and be a better workspace for every members.",
            years, full_name, organization
        ),
        Language::Vn => format!(
            "Chúc một ngày tốt lành!\n\n\
             Hôm nay, ngày tròn {} năm, kỷ niệm ngày {} gia nhập công ty {} xin chúc mừng và cảm ơn những đóng góp của bạn trong thời gian vừa qua.\n\n\
             Hy vọng chúng ta có thể cùng công ty ngày càng phát triển và trở thành không gian làm việc tốt hơn cho mọi thành viên.",
            years, full_name, organization
        ),
        Language::Jp => format!("{}入社記念日おめでとうございます！今年もよろしくお願いします。", years),
    }
}

pub fn contract_body(full_name: &str, expiration: NaiveDate) -> String {
    format!(
        "{}'s contract will expire {}. Please renew a new contract for {}",
        full_name,
        expiration.format(dates::FORMAT_DATE_DISPLAY),
        full_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_body_uses_display_date() {
        let body = contract_body("Tran Thi B", NaiveDate::from_ymd_opt(2024, 5, 9).unwrap());
        assert_eq!(
            body,
            "Tran Thi B's contract will expire 2024/05/09. Please renew a new contract for Tran Thi B"
        );
    }

    #[test]
    fn test_anniversary_body_counts_years() {
        assert!(anniversary_body(Language::En, 3, "An", "Acme").contains("3-year anniversary since An joined Acme"));
        assert!(anniversary_body(Language::Jp, 3, "An", "Acme").starts_with("3入社記念日"));
    }
}
