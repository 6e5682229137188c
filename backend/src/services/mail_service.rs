use thiserror::Error;
use tracing::info;

/// The message a winner would receive with their code.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountEmail {
    pub to: String,
    pub name: String,
    pub dob: Option<String>,
    pub prize: String,
    pub discount_code: String,
}

impl DiscountEmail {
    pub fn subject(&self) -> String {
        format!("Your {} discount code", self.prize)
    }

    pub fn body(&self) -> String {
        format!(
            "Hi {}, you have won {}! Use code: {}",
            self.name, self.prize, self.discount_code
        )
    }
}

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

pub trait DiscountMailer: Send + Sync {
    fn send(&self, email: &DiscountEmail) -> Result<(), MailError>;
}

/// Stand-in delivery: writes the email to the log instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl DiscountMailer for LogMailer {
    fn send(&self, email: &DiscountEmail) -> Result<(), MailError> {
        info!(
            "📧 [Mock Email Service] To: {} | Name: {} | DOB: {} | Prize: {} | Code: {}",
            email.to,
            email.name,
            email.dob.as_deref().unwrap_or(""),
            email.prize,
            email.discount_code
        );
        info!("📧 Subject: {} | Body: {}", email.subject(), email.body());
        Ok(())
    }
}
