//! Plain-text builders for the emails the workflows send.

use coursehub_core::traits::EmailMessage;
use coursehub_entity::user::User;

/// Certificate email sent when a course is completed.
pub fn certificate(user: &User, course_title: &str, certificate_url: &str) -> EmailMessage {
    EmailMessage {
        to: user.email.clone(),
        subject: format!("Congratulations! You've completed {course_title}"),
        template: "certificate".to_string(),
        body: format!(
            "Hi {},\n\nFantastic work! You've successfully completed {course_title}.\n\
             Your certificate of completion is ready: {certificate_url}\n",
            user.display_name()
        ),
    }
}

/// Confirmation email sent after enrolling.
pub fn enrollment(user: &User, course_title: &str) -> EmailMessage {
    EmailMessage {
        to: user.email.clone(),
        subject: format!("You're enrolled in {course_title}!"),
        template: "enrollment".to_string(),
        body: format!(
            "Hi {},\n\nYou're now enrolled in {course_title}. Happy learning!\n",
            user.display_name()
        ),
    }
}
