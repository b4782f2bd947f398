//! Данные multipart-формы создания и редактирования записи.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::shared::error::AppError;

/// Файл из поля формы
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Поля формы: имя поля -> текст или файл
#[derive(Debug, Clone, Default)]
pub struct FormPayload {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Прочитать все поля запроса. Поле с именем файла считается файлом,
    /// пустой файл (не выбранный в форме) пропускается.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut payload = Self::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("multipart: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("multipart: {}", e)))?;
                    if !bytes.is_empty() {
                        payload.files.insert(
                            name,
                            UploadedFile {
                                file_name,
                                content_type,
                                bytes: bytes.to_vec(),
                            },
                        );
                    }
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("multipart: {}", e)))?;
                    payload.fields.insert(name, text);
                }
            }
        }
        Ok(payload)
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_file(mut self, name: &str, file_name: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(
            name.to_string(),
            UploadedFile {
                file_name: file_name.to_string(),
                content_type: None,
                bytes,
            },
        );
        self
    }

    /// Непустое значение поля без пробелов по краям
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn required(&self, name: &str) -> Result<String, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::Validation(format!("field '{}' is required", name)))
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        self.parse_with(name, |v| v.parse::<T>().ok())
    }

    pub fn parse_with<T>(
        &self,
        name: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Option<T>, AppError> {
        match self.text(name) {
            None => Ok(None),
            Some(value) => parse(&value).map(Some).ok_or_else(|| {
                AppError::Validation(format!("field '{}' has invalid value '{}'", name, value))
            }),
        }
    }

    /// Дата `YYYY-MM-DD`
    pub fn date(&self, name: &str) -> Result<Option<NaiveDate>, AppError> {
        self.parse_with(name, |v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
    }

    /// Момент времени: RFC 3339, значение `datetime-local` (`YYYY-MM-DDTHH:MM`)
    /// или дата (полночь UTC)
    pub fn datetime(&self, name: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        self.parse_with(name, parse_datetime)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_text_trims_and_skips_blank() {
        let form = FormPayload::new()
            .with_field("title", "  Derby day ")
            .with_field("description", "   ");
        assert_eq!(form.text("title").as_deref(), Some("Derby day"));
        assert_eq!(form.text("description"), None);
        assert!(matches!(
            form.required("description"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_numbers() {
        let form = FormPayload::new()
            .with_field("number", "10")
            .with_field("height", "tall");
        assert_eq!(form.parse::<u32>("number").unwrap(), Some(10));
        assert_eq!(form.parse::<u32>("missing").unwrap(), None);
        assert!(form.parse::<u32>("height").is_err());
    }

    #[test]
    fn test_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 18, 15, 30, 0).unwrap();
        for value in ["2024-05-18T15:30", "2024-05-18T15:30:00", "2024-05-18T17:30:00+02:00"] {
            let form = FormPayload::new().with_field("match_date", value);
            assert_eq!(form.datetime("match_date").unwrap(), Some(expected), "{}", value);
        }

        let form = FormPayload::new().with_field("match_date", "2024-05-18");
        assert_eq!(
            form.datetime("match_date").unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 5, 18, 0, 0, 0).unwrap())
        );
        let form = FormPayload::new().with_field("match_date", "18.05.2024");
        assert!(form.datetime("match_date").is_err());
    }

    #[test]
    fn test_take_file_once() {
        let mut form = FormPayload::new().with_file("picture", "cup.jpg", vec![1]);
        assert_eq!(form.take_file("picture").map(|f| f.file_name), Some("cup.jpg".into()));
        assert!(form.take_file("picture").is_none());
    }
}
