//! Field constraints and cross-field rules for the intake form
//!
//! Every rule is evaluated independently and the violations are collected
//! into one [`FieldErrors`] map. Closed-set membership of enumerated fields
//! is left to the UI; here they only have to be non-empty.

use crate::config::AttachmentPolicy;
use serde::Serialize;
use shared::FormFields;
use std::collections::BTreeMap;
use std::fmt;
use validator::{ValidateEmail, ValidateUrl};

/// Minimum description length, counted in characters
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// A form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Company,
    Team,
    Requester,
    Title,
    SystemName,
    Assignee,
    RequestType,
    RequestDate,
    DueDate,
    Description,
    AttachmentUrl,
    ReplyEmail,
}

impl Field {
    /// Field key as used in drafts and error maps
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Company => "company",
            Field::Team => "team",
            Field::Requester => "requester",
            Field::Title => "title",
            Field::SystemName => "system_name",
            Field::Assignee => "assignee",
            Field::RequestType => "request_type",
            Field::RequestDate => "request_date",
            Field::DueDate => "due_date",
            Field::Description => "description",
            Field::AttachmentUrl => "attachment_url",
            Field::ReplyEmail => "reply_email",
        }
    }

    /// Form label
    pub fn label(&self) -> &'static str {
        match self {
            Field::Company => "소속회사",
            Field::Team => "소속 부서/팀",
            Field::Requester => "요청자 이름",
            Field::Title => "제목",
            Field::SystemName => "시스템",
            Field::Assignee => "시스템 담당자",
            Field::RequestType => "요청 구분",
            Field::RequestDate => "요청일자",
            Field::DueDate => "완료일자",
            Field::Description => "상세 내용",
            Field::AttachmentUrl => "첨부 파일",
            Field::ReplyEmail => "회신 이메일",
        }
    }

    /// Whether the field holds a value: trimmed text is non-empty, dates are set
    pub fn is_filled(&self, fields: &FormFields) -> bool {
        let text = match self {
            Field::Company => &fields.company,
            Field::Team => &fields.team,
            Field::Requester => &fields.requester,
            Field::Title => &fields.title,
            Field::SystemName => &fields.system_name,
            Field::Assignee => &fields.assignee,
            Field::RequestType => &fields.request_type,
            Field::Description => &fields.description,
            Field::AttachmentUrl => &fields.attachment_url,
            Field::ReplyEmail => &fields.reply_email,
            Field::RequestDate => return fields.request_date.is_some(),
            Field::DueDate => return fields.due_date.is_some(),
        };
        !text.trim().is_empty()
    }

    /// Message shown when a required field is missing
    fn required_message(&self) -> &'static str {
        match self {
            Field::Company => "소속회사를 선택해주세요",
            Field::Team => "소속 부서/팀을 입력해주세요",
            Field::Requester => "요청자 이름을 입력해주세요",
            Field::Title => "제목을 입력해주세요",
            Field::SystemName => "시스템을 선택해주세요",
            Field::Assignee => "시스템 담당자를 선택해주세요",
            Field::RequestType => "요청 구분을 선택해주세요",
            Field::RequestDate => "요청일자를 선택해주세요",
            Field::Description => DESCRIPTION_TOO_SHORT,
            Field::AttachmentUrl => "파일을 최소 1개 이상 첨부해주세요",
            Field::DueDate | Field::ReplyEmail => "값을 입력해주세요",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DESCRIPTION_TOO_SHORT: &str = "상세 내용은 최소 10자 이상 입력해주세요";
const DUE_BEFORE_REQUEST: &str = "완료일자는 요청일자보다 같거나 이후여야 합니다";
const INVALID_URL: &str = "올바른 URL을 입력해주세요";
const INVALID_EMAIL: &str = "올바른 이메일 주소를 입력해주세요";

/// Fields that must be filled before submission.
///
/// Shared by validation and progress so the two can never disagree.
pub fn required_fields(policy: AttachmentPolicy) -> &'static [Field] {
    const BASE: [Field; 9] = [
        Field::Company,
        Field::Team,
        Field::Requester,
        Field::Title,
        Field::SystemName,
        Field::Assignee,
        Field::RequestType,
        Field::RequestDate,
        Field::Description,
    ];
    const WITH_ATTACHMENT: [Field; 10] = [
        Field::Company,
        Field::Team,
        Field::Requester,
        Field::Title,
        Field::SystemName,
        Field::Assignee,
        Field::RequestType,
        Field::RequestDate,
        Field::Description,
        Field::AttachmentUrl,
    ];

    match policy {
        AttachmentPolicy::Optional => &BASE,
        AttachmentPolicy::Required => &WITH_ATTACHMENT,
    }
}

/// Violations keyed by field, at most one message per field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub(crate) fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// A single "required" violation on `field`
    pub(crate) fn missing(field: Field) -> Self {
        let mut errors = Self::default();
        errors.insert(field, field.required_message());
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Validate form values. Pure and deterministic.
pub fn validate(fields: &FormFields, policy: AttachmentPolicy) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();

    for field in required_fields(policy) {
        if !field.is_filled(fields) {
            errors.insert(*field, field.required_message());
        }
    }

    if fields.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        errors.insert(Field::Description, DESCRIPTION_TOO_SHORT);
    }

    if let (Some(request), Some(due)) = (fields.request_date, fields.due_date)
        && due < request
    {
        errors.insert(Field::DueDate, DUE_BEFORE_REQUEST);
    }

    // Under `Required` the value is an uploaded-file handle, not a link
    let attachment = fields.attachment_url.trim();
    if policy == AttachmentPolicy::Optional
        && !attachment.is_empty()
        && !attachment.to_string().validate_url()
    {
        errors.insert(Field::AttachmentUrl, INVALID_URL);
    }

    let email = fields.reply_email.trim();
    if !email.is_empty() && !email.to_string().validate_email() {
        errors.insert(Field::ReplyEmail, INVALID_EMAIL);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
