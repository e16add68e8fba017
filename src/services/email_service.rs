// src/services/email_service.rs
// DOCUMENTATION: Placeholder outbound email service
// PURPOSE: Compose OTP messages; delivery is stubbed and logged, never transmitted

/// Outbound email service with a stubbed transport
/// Real delivery is out of scope for this service; every message is
/// composed and written to the log so the flow stays testable end to end
#[derive(Clone)]
pub struct EmailService {
    sender: String,
}

impl EmailService {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }

    /// "Send" a one-time code
    pub fn send_otp(&self, recipient: &str, purpose: &str, code: &str) {
        let subject = match purpose {
            "reset" => "Reset your Stillmind password",
            _ => "Verify your Stillmind account",
        };

        let body = Self::compose_otp_body(purpose, code);

        log::info!(
            "[email stub] from={} to={} subject={:?} body={:?}",
            self.sender,
            recipient,
            subject,
            body
        );
    }

    fn compose_otp_body(purpose: &str, code: &str) -> String {
        match purpose {
            "reset" => format!(
                "Your password reset code is {}. It expires in a few minutes. \
                 If you did not request this, you can ignore this message.",
                code
            ),
            _ => format!(
                "Welcome to Stillmind! Your verification code is {}. \
                 It expires in a few minutes.",
                code
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_verify_body_carries_code() {
        let body = EmailService::compose_otp_body("verify", "123456");
        assert!(body.contains("123456"));
        assert!(body.contains("verification"));
    }

    #[test]
    fn test_compose_reset_body_carries_code() {
        let body = EmailService::compose_otp_body("reset", "654321");
        assert!(body.contains("654321"));
        assert!(body.contains("reset"));
    }
}
