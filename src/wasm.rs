// 浏览器扩展使用的绑定，只暴露解密和转换所需的最小接口

use js_sys::{Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::{
    converter,
    cover::{CoverFetcher, HttpCoverFetcher},
    decoder::decrypt_ncm,
    message::{self, ConvertRequest},
};

#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    Ok(())
}

/// 解密 NCM 数据，返回 `{ audioData: Uint8Array, metadata, coverUrl }`。
#[wasm_bindgen(js_name = decryptNcm)]
pub fn decrypt_ncm_js(data: &[u8]) -> Result<JsValue, JsValue> {
    let result = decrypt_ncm(data).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let output = Object::new();
    Reflect::set(
        &output,
        &"audioData".into(),
        &Uint8Array::from(result.audio_data.as_slice()),
    )?;
    Reflect::set(
        &output,
        &"metadata".into(),
        &serde_wasm_bindgen::to_value(&result.metadata)?,
    )?;
    let cover_url = result.cover_url.map_or(JsValue::UNDEFINED, |url| url.into());
    Reflect::set(&output, &"coverUrl".into(), &cover_url)?;

    Ok(output.into())
}

/// 处理 `{ fileData: number[], fileName }` 形式的转换消息。
#[wasm_bindgen(js_name = handleConvert)]
pub fn handle_convert_js(request_js: JsValue) -> Result<JsValue, JsValue> {
    let request: ConvertRequest = serde_wasm_bindgen::from_value(request_js)?;
    let response = message::handle_convert(&request);
    Ok(serde_wasm_bindgen::to_value(&response)?)
}

#[wasm_bindgen(js_name = getMimeType)]
pub fn get_mime_type(format: &str) -> String {
    converter::mime_type_for(format).to_string()
}

#[wasm_bindgen(js_name = getOutputFileName)]
pub fn get_output_file_name(input_path: &str, format: &str) -> String {
    converter::output_file_name(input_path, format)
}

#[wasm_bindgen(js_name = downloadImage)]
pub async fn download_image(url: String) -> Result<Uint8Array, JsValue> {
    let cover = HttpCoverFetcher::default()
        .fetch_cover(&url)
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(Uint8Array::from(cover.as_slice()))
}
