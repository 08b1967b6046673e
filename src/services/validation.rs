use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::posts::{FieldErrors, Intent, PostDraft, ADMIN_SLUG, NEW_POST_SLUG};

#[derive(Validate, Debug)]
struct CreatePostForm {
    #[validate(length(min = 1, message = "Title is required"))]
    title: String,
    #[validate(
        length(min = 1, message = "Slug is required"),
        custom(function = "validate_slug")
    )]
    slug: String,
    #[validate(length(min = 1, message = "Markdown is required"))]
    markdown: String,
}

#[derive(Validate, Debug)]
struct UpdatePostForm {
    #[validate(length(min = 1, message = "Title is required"))]
    title: String,
    #[validate(length(min = 1, message = "Markdown is required"))]
    markdown: String,
}

#[derive(Validate, Debug)]
struct DeletePostForm {
    #[validate(length(min = 1, message = "Slug is required"))]
    slug: String,
}

/// Emptiness is reported by the length rule, so an empty slug passes here.
fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Ok(());
    }
    if slug == NEW_POST_SLUG {
        return Err(ValidationError::new("reserved").with_message("Slug 'new' is reserved".into()));
    }
    if slug == ADMIN_SLUG {
        return Err(
            ValidationError::new("reserved").with_message("Slug 'admin' is reserved".into())
        );
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::new("slug_format")
            .with_message("Slug may only contain letters, digits, '-' and '_'".into()));
    }
    Ok(())
}

/// A draft that passed validation for its intent. Title and slug are
/// trimmed, markdown is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub title: String,
    pub slug: String,
    pub markdown: String,
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::default();
        for (field, errs) in errors.field_errors() {
            let message = errs.first().map(|err| {
                err.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string())
            });
            match &*field {
                "title" => fields.title = message,
                "slug" => fields.slug = message,
                "markdown" => fields.markdown = message,
                _ => {}
            }
        }
        fields
    }
}

pub struct PostFormValidator;

impl PostFormValidator {
    /// Checks every rule for `mode` and reports all violations at once.
    ///
    /// `update` ignores the slug field: the target comes from the route.
    /// `delete` only needs the target slug, carried in `draft.slug`.
    pub fn validate(draft: &PostDraft, mode: Intent) -> Result<ValidDraft, FieldErrors> {
        let title = draft.title.as_deref().unwrap_or_default().trim();
        let slug = draft.slug.as_deref().unwrap_or_default().trim();
        let markdown = draft.markdown.as_deref().unwrap_or_default();

        let result = match mode {
            Intent::Create => CreatePostForm {
                title: title.to_string(),
                slug: slug.to_string(),
                markdown: markdown.trim().to_string(),
            }
            .validate(),
            Intent::Update => UpdatePostForm {
                title: title.to_string(),
                markdown: markdown.trim().to_string(),
            }
            .validate(),
            Intent::Delete => DeletePostForm {
                slug: slug.to_string(),
            }
            .validate(),
        };
        if let Err(errors) = result {
            let errors = FieldErrors::from(errors);
            if !errors.is_empty() {
                return Err(errors);
            }
        }

        Ok(ValidDraft {
            title: title.to_string(),
            slug: slug.to_string(),
            markdown: markdown.to_string(),
        })
    }
}
