use crate::{Email, MailerError};

/// The access-link email sent on every successful issue request.
pub struct AccessLinkEmail;

impl AccessLinkEmail {
    /// Build the email carrying `access_link`.
    ///
    /// `expires_minutes` is rendered into the body copy so the stated
    /// lifetime always matches the configured token TTL.
    pub fn build(
        from: &str,
        to: &str,
        access_link: &str,
        app_name: &str,
        expires_minutes: i64,
    ) -> Result<Email, MailerError> {
        Email::builder()
            .from(from)
            .to(to)
            .subject(format!("Your {app_name} access link"))
            .html_body(render_html(access_link, app_name, expires_minutes))
            .text_body(render_text(access_link, app_name, expires_minutes))
            .build()
    }
}

fn render_html(access_link: &str, app_name: &str, expires_minutes: i64) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="text-align: center; padding: 40px 20px;">
    <h1 style="color: #333; margin-bottom: 20px;">Access {app_name}</h1>
    <p style="color: #666; font-size: 16px; margin-bottom: 30px;">Click the button below to securely access your account:</p>
    <a href="{access_link}" style="display: inline-block; background: #0066cc; color: white; padding: 15px 30px; text-decoration: none; border-radius: 6px; font-weight: 600; font-size: 16px;">Access {app_name}</a>
    <p style="color: #999; font-size: 14px; margin-top: 30px;">This link expires in {expires_minutes} minutes.<br>If you didn't request this, please ignore this email.</p>
  </div>
</div>"#
    )
}

fn render_text(access_link: &str, app_name: &str, expires_minutes: i64) -> String {
    format!(
        "Access {app_name}\n\n\
         Open the link below to securely access your account:\n\n\
         {access_link}\n\n\
         This link expires in {expires_minutes} minutes.\n\
         If you didn't request this, please ignore this email.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_link_email() {
        let email = AccessLinkEmail::build(
            "noreply@testapp.com",
            "john@example.com",
            "https://testapp.com?token=mlk_abc123",
            "Test App",
            15,
        )
        .unwrap();

        assert_eq!(email.to, "john@example.com");
        assert_eq!(email.from, "noreply@testapp.com");
        assert_eq!(email.subject, "Your Test App access link");

        let html = email.html_body.unwrap();
        assert!(html.contains("https://testapp.com?token=mlk_abc123"));
        assert!(html.contains("expires in 15 minutes"));

        let text = email.text_body.unwrap();
        assert!(text.contains("https://testapp.com?token=mlk_abc123"));
        assert!(text.contains("expires in 15 minutes"));
    }

    #[test]
    fn test_expiry_copy_follows_ttl() {
        let email = AccessLinkEmail::build(
            "noreply@testapp.com",
            "jane@example.com",
            "https://testapp.com?token=mlk_xyz",
            "Test App",
            5,
        )
        .unwrap();

        assert!(email.html_body.unwrap().contains("expires in 5 minutes"));
    }
}
