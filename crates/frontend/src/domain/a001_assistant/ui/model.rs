//! Assistant page - Model (API functions)

use contracts::assistant::{
    ChatReply, ChatRequest, DiagnosisReply, ANALYZE_IMAGE_PATH, CHAT_PATH, FILE_FIELD,
    PROMPT_FIELD, UPLOAD_PATH,
};
use gloo_net::http::Request;
use web_sys::{File, FormData};

use crate::shared::api_utils::{api_url, check_response, read_json, ApiError};

/// Multipart form with the file under `file`, keeping its original name
fn file_form(file: &File) -> Result<FormData, ApiError> {
    let form = FormData::new().map_err(|e| ApiError::Build(format!("{e:?}")))?;
    form.append_with_blob_and_filename(FILE_FIELD, file, &file.name())
        .map_err(|e| ApiError::Build(format!("{e:?}")))?;
    Ok(form)
}

/// Загрузить документ пациента
pub async fn upload_document(file: &File) -> Result<(), ApiError> {
    let form = file_form(file)?;

    log::debug!("POST {} ({}, {} bytes)", UPLOAD_PATH, file.name(), file.size());
    let response = Request::post(&api_url(UPLOAD_PATH))
        .body(form)
        .map_err(|e| ApiError::Build(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    check_response(response).await?;
    Ok(())
}

/// Задать вопрос по загруженному документу
pub async fn ask(request: &ChatRequest) -> Result<ChatReply, ApiError> {
    log::debug!("POST {} ({} chars)", CHAT_PATH, request.message.chars().count());
    let response = Request::post(&api_url(CHAT_PATH))
        .json(request)
        .map_err(|e| ApiError::Build(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    read_json(check_response(response).await?).await
}

/// Отправить снимок на анализ
pub async fn analyze_image(file: &File, prompt: &str) -> Result<DiagnosisReply, ApiError> {
    let form = file_form(file)?;
    form.append_with_str(PROMPT_FIELD, prompt)
        .map_err(|e| ApiError::Build(format!("{e:?}")))?;

    log::debug!("POST {} ({})", ANALYZE_IMAGE_PATH, file.name());
    let response = Request::post(&api_url(ANALYZE_IMAGE_PATH))
        .body(form)
        .map_err(|e| ApiError::Build(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    read_json(check_response(response).await?).await
}
