//! Completion percentage of the required fields

use crate::config::AttachmentPolicy;
use crate::validation::required_fields;
use shared::FormFields;

/// Percentage (0–100) of required fields currently filled, rounded half up
pub fn progress(fields: &FormFields, policy: AttachmentPolicy) -> u8 {
    let required = required_fields(policy);
    let filled = required.iter().filter(|f| f.is_filled(fields)).count();
    percentage(filled, required.len())
}

fn percentage(filled: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let rounded = (filled * 200 + total) / (total * 2);
    rounded.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Field;
    use chrono::NaiveDate;

    fn fill(fields: &mut FormFields, field: Field) {
        match field {
            Field::Company => fields.company = "아성다이소".into(),
            Field::Team => fields.team = "IT개발팀".into(),
            Field::Requester => fields.requester = "홍길동".into(),
            Field::Title => fields.title = "로그인 오류".into(),
            Field::SystemName => fields.system_name = "DMS".into(),
            Field::Assignee => fields.assignee = "최지영".into(),
            Field::RequestType => fields.request_type = "장애".into(),
            Field::RequestDate => fields.request_date = NaiveDate::from_ymd_opt(2024, 1, 10),
            Field::DueDate => fields.due_date = NaiveDate::from_ymd_opt(2024, 1, 20),
            Field::Description => fields.description = "로그인 화면에서 오류가 발생합니다".into(),
            Field::AttachmentUrl => fields.attachment_url = "https://files.example.com/a.png".into(),
            Field::ReplyEmail => fields.reply_email = "me@example.com".into(),
        }
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(progress(&FormFields::default(), AttachmentPolicy::Optional), 0);
        assert_eq!(progress(&FormFields::default(), AttachmentPolicy::Required), 0);
    }

    #[test]
    fn test_all_required_is_hundred() {
        for policy in [AttachmentPolicy::Optional, AttachmentPolicy::Required] {
            let mut fields = FormFields::default();
            for field in required_fields(policy) {
                fill(&mut fields, *field);
            }
            assert_eq!(progress(&fields, policy), 100);
        }
    }

    #[test]
    fn test_monotonic_as_fields_fill() {
        let policy = AttachmentPolicy::Required;
        let mut fields = FormFields::default();
        let mut last = progress(&fields, policy);

        for field in required_fields(policy) {
            fill(&mut fields, *field);
            let now = progress(&fields, policy);
            assert!(now > last, "{field} did not raise progress");
            last = now;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn test_optional_fields_do_not_count() {
        let mut fields = FormFields::default();
        fill(&mut fields, Field::DueDate);
        fill(&mut fields, Field::ReplyEmail);
        fill(&mut fields, Field::AttachmentUrl);
        assert_eq!(progress(&fields, AttachmentPolicy::Optional), 0);
        assert_eq!(progress(&fields, AttachmentPolicy::Required), 10);
    }

    #[test]
    fn test_whitespace_is_not_filled() {
        let fields = FormFields {
            title: "   ".into(),
            ..Default::default()
        };
        assert_eq!(progress(&fields, AttachmentPolicy::Optional), 0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(percentage(1, 9), 11);
        assert_eq!(percentage(5, 9), 56);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(3, 10), 30);
        assert_eq!(percentage(0, 0), 100);
    }
}
