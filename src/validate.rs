use crate::error::{Error, Result};
use crate::model::{NewTask, TaskUpdate};

pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Validate a task title: non-blank and at most 255 characters.
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("task title cannot be empty"));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(Error::validation(format!(
            "task title is {len} characters; the limit is {MAX_TITLE_CHARS}"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<()> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_CHARS {
        return Err(Error::validation(format!(
            "task description is {len} characters; the limit is {MAX_DESCRIPTION_CHARS}"
        )));
    }
    Ok(())
}

pub fn validate_new_task(task: &NewTask) -> Result<()> {
    validate_title(&task.title)?;
    validate_description(&task.description)
}

/// Only present fields are checked. An empty update is valid.
pub fn validate_update(update: &TaskUpdate) -> Result<()> {
    if let Some(title) = &update.title {
        validate_title(title)?;
    }
    if let Some(description) = &update.description {
        validate_description(description)?;
    }
    Ok(())
}
