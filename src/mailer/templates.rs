use super::OutgoingMail;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTemplate {
    Recruitment,
    LeaveRequest,
    RegisterSuccessful,
    RegistrationCode,
    EventReminder,
    Contract,
    Plain,
}

impl MailTemplate {
    /// Name stored in `email_noti_requests.template`.
    pub fn key(self) -> &'static str {
        match self {
            MailTemplate::Recruitment => "recruitment",
            MailTemplate::LeaveRequest => "leave_request",
            MailTemplate::RegisterSuccessful => "register_successful",
            MailTemplate::RegistrationCode => "registration_code",
            MailTemplate::EventReminder => "event_reminder",
            MailTemplate::Contract => "contract",
            MailTemplate::Plain => "plain",
        }
    }

    pub fn from_key(key: &str) -> Self {
        match key {
            "recruitment" => MailTemplate::Recruitment,
            "leave_request" => MailTemplate::LeaveRequest,
            "register_successful" => MailTemplate::RegisterSuccessful,
            "registration_code" => MailTemplate::RegistrationCode,
            "event_reminder" => MailTemplate::EventReminder,
            "contract" => MailTemplate::Contract,
            _ => MailTemplate::Plain,
        }
    }

    fn heading(self) -> &'static str {
        match self {
            MailTemplate::Recruitment => "Recruitment update",
            MailTemplate::LeaveRequest => "Leave request",
            MailTemplate::RegisterSuccessful => "Welcome to Micro ERP",
            MailTemplate::RegistrationCode => "Complete your registration",
            MailTemplate::EventReminder => "Reminder",
            MailTemplate::Contract => "Contract notice",
            MailTemplate::Plain => "",
        }
    }

    fn call_to_action(self) -> &'static str {
        match self {
            MailTemplate::RegistrationCode => "Register now",
            MailTemplate::RegisterSuccessful => "Sign in",
            _ => "Open in Micro ERP",
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML body of a mail.
pub fn render(mail: &OutgoingMail) -> String {
    let mut html = String::from("<html><body style=\"font-family: sans-serif\">");

    let heading = mail.template.heading();
    if !heading.is_empty() {
        html.push_str(&format!("<h2>{}</h2>", heading));
    }

    for line in mail.content.lines() {
        html.push_str(&format!("<p>{}</p>", escape(line)));
    }

    if let Some(url) = mail.url.as_deref().filter(|u| !u.is_empty()) {
        html.push_str(&format!(
            "<p><a href=\"{}\">{}</a></p>",
            escape(url),
            mail.template.call_to_action()
        ));
    }

    if let Some(tag) = mail.org_tag.as_deref().filter(|t| !t.is_empty()) {
        html.push_str(&format!("<p>Organization: <b>{}</b></p>", escape(tag)));
    }

    html.push_str("</body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(template: MailTemplate, content: &str, url: Option<&str>) -> OutgoingMail {
        OutgoingMail {
            to: vec!["a@example.com".into()],
            subject: "subject".into(),
            template,
            content: content.into(),
            url: url.map(String::from),
            org_tag: Some("ACME".into()),
        }
    }

    #[test]
    fn test_unknown_template_key_is_plain() {
        assert_eq!(MailTemplate::from_key("leave_request"), MailTemplate::LeaveRequest);
        assert_eq!(MailTemplate::from_key("no-such"), MailTemplate::Plain);
    }

    #[test]
    fn test_render_escapes_content_and_links_url() {
        let html = render(&mail(
            MailTemplate::RegistrationCode,
            "<b>Tom</b> & co",
            Some("https://erp.example.com/register?code=abc"),
        ));

        assert!(html.contains("&lt;b&gt;Tom&lt;/b&gt; &amp; co"));
        assert!(html.contains("href=\"https://erp.example.com/register?code=abc\""));
        assert!(html.contains("Register now"));
        assert!(html.contains("<b>ACME</b>"));
    }

    #[test]
    fn test_render_skips_empty_url() {
        let html = render(&mail(MailTemplate::Plain, "hello", Some("")));
        assert!(!html.contains("<a "));
    }
}
