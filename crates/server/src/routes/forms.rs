//! Multipart form reading shared by the article and understanding routes.

use std::collections::HashMap;

use axum::extract::Multipart;
use service::uploads::UploadedFile;

use crate::errors::JsonApiError;

#[derive(Debug, Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    /// `(field name, file)` in submission order. Empty file parts are skipped.
    pub files: Vec<(String, UploadedFile)>,
}

impl FormData {
    pub fn take(&mut self, name: &str) -> Option<String> { self.fields.remove(name) }

    /// First file submitted under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let idx = self.files.iter().position(|(n, _)| n == name)?;
        Some(self.files.remove(idx).1)
    }

    /// Every file submitted under `name`.
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files).into_iter().partition(|(n, _)| n == name);
        self.files = rest;
        matching.into_iter().map(|(_, f)| f).collect()
    }
}

pub async fn read_form(mut multipart: Multipart) -> Result<FormData, JsonApiError> {
    let mut form = FormData::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| JsonApiError::bad_request(format!("failed to read file '{file_name}': {e}")))?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.files.push((name, UploadedFile { file_name, content_type, bytes: bytes.to_vec() }));
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| JsonApiError::bad_request(format!("failed to read field '{name}': {e}")))?;
                form.fields.insert(name, value);
            }
        }
    }
    Ok(form)
}
