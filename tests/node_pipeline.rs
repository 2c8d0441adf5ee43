use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use llmapi::utils::encode_byte_to_base64;
use llmapi::{ResponsesFn, ResponsesFuture, ResponsesRequest, ResponsesResponse};
use photo_edit_lib::{
    BinaryData, InputItem, MemoryDebugLog, NodeConfig, NodeParameters, OpenAiCredentials,
    PhotoEditNode, API_ERROR_LOG_FILE, DEBUG_LOG_FILE,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn image_response(bytes: &[u8]) -> ResponsesResponse {
    serde_json::from_value(json!({
        "id": "resp_ok",
        "model": "gpt-4o-mini",
        "usage": { "total_tokens": 42 },
        "output": [{
            "type": "image_generation_call",
            "id": "ig_ok",
            "result": encode_byte_to_base64(bytes),
            "size": "1024x1024",
            "quality": "low",
            "output_format": "png"
        }]
    }))
    .unwrap()
}

/// Answers every request with `PNGDATA`, counting calls.
fn succeeding(calls: Arc<AtomicUsize>) -> ResponsesFn {
    Arc::new(move |_request: ResponsesRequest| -> ResponsesFuture {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok::<_, anyhow::Error>(image_response(b"PNGDATA")) })
    })
}

fn photo(bytes: &[u8]) -> InputItem {
    InputItem::with_binary("data", BinaryData::from_bytes(bytes, "photo.png", "image/png"))
}

fn node(config: NodeConfig, dispatch: ResponsesFn, log: Arc<MemoryDebugLog>) -> PhotoEditNode {
    PhotoEditNode::with_parts(config, &OpenAiCredentials::new("sk-test"), dispatch, log).unwrap()
}

#[tokio::test]
async fn failed_acquisition_keeps_batch_shape() {
    let calls = Arc::new(AtomicUsize::new(0));
    let log = Arc::new(MemoryDebugLog::new());
    let node = node(NodeConfig::default(), succeeding(calls.clone()), log.clone());

    let items = vec![
        photo(b"first"),
        InputItem::with_binary("thumbnail", BinaryData::from_bytes(b"x", "t.png", "image/png")),
        photo(b"third"),
        photo(b"fourth"),
    ];
    let outputs = node.execute(&items, &NodeParameters::default()).await.unwrap();

    assert_eq!(outputs.len(), 4);
    let flags: Vec<bool> = outputs.iter().map(|output| output.is_success()).collect();
    assert_eq!(flags, vec![true, false, true, true]);
    let order: Vec<usize> = outputs.iter().map(|output| output.paired_item.item).collect();
    assert_eq!(order, vec![0, 1, 2, 3]);

    let failed = &outputs[1];
    assert_eq!(failed.json["errorType"], json!("MissingBinaryData"));
    assert_eq!(failed.json["availableProperties"], json!(["thumbnail"]));
    assert!(failed.binary.is_empty());

    assert_eq!(calls.load(Ordering::SeqCst), 3, "no request for the failed item");
    assert_eq!(outputs[3].binary["data"].to_bytes().unwrap(), b"PNGDATA");
    assert!(!log.records_in(DEBUG_LOG_FILE).is_empty());
}

#[tokio::test]
async fn stop_on_fail_surfaces_the_item_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let config = NodeConfig {
        continue_on_fail: false,
        ..NodeConfig::default()
    };
    let node = node(config, succeeding(calls.clone()), Arc::new(MemoryDebugLog::new()));

    let params = vec![
        NodeParameters::default(),
        NodeParameters::base64("chibi", "not-an-image"),
    ];
    let err = node
        .execute(&[photo(b"a"), InputItem::default(), photo(b"c")], &params)
        .await
        .unwrap_err();

    assert_eq!(err.item_index, 1);
    assert_eq!(err.source.kind(), "InvalidBase64Prefix");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transport_error_is_contained_to_its_item() {
    let log = Arc::new(MemoryDebugLog::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let dispatch: ResponsesFn = Arc::new(move |_request: ResponsesRequest| -> ResponsesFuture {
        let call = counter.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if call == 0 {
                Err(anyhow::anyhow!("timeout"))
            } else {
                Ok(image_response(b"PNGDATA"))
            }
        })
    });
    let node = node(NodeConfig::default(), dispatch, log.clone());

    let outputs = node
        .execute(&[photo(b"a"), photo(b"b")], &NodeParameters::default())
        .await
        .unwrap();

    assert_eq!(
        outputs[0].json,
        json!({
            "error": "timeout",
            "style": "chibi",
            "success": false,
            "imageSource": "binary",
            "errorType": "api_request_failed",
        })
    );
    assert!(outputs[1].is_success());

    let errors = log.records_in(API_ERROR_LOG_FILE);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["error"], json!("timeout"));
    assert_eq!(errors[0]["requestUrl"], json!("https://api.openai.com/v1/responses"));
}

#[tokio::test]
async fn empty_output_is_a_failure_item() {
    let dispatch: ResponsesFn = Arc::new(|_request: ResponsesRequest| -> ResponsesFuture {
        Box::pin(async {
            Ok::<_, anyhow::Error>(serde_json::from_value::<ResponsesResponse>(
                json!({ "id": "resp_empty", "output": [] }),
            )?)
        })
    });
    let node = node(NodeConfig::default(), dispatch, Arc::new(MemoryDebugLog::new()));

    let outputs = node
        .execute(&[photo(b"a")], &NodeParameters::binary("cartoon", "data"))
        .await
        .unwrap();

    assert_eq!(outputs[0].json["error"], json!("API response missing output data"));
    assert_eq!(outputs[0].json["responseId"], json!("resp_empty"));
    assert_eq!(outputs[0].json["style"], json!("cartoon"));
    assert!(outputs[0].binary.is_empty());
}

#[tokio::test]
async fn concurrent_dispatch_preserves_input_order() {
    // Earlier items answer later, so completion order is reversed.
    let order = Arc::new(AtomicUsize::new(0));
    let slow_first: ResponsesFn = {
        let order = order.clone();
        Arc::new(move |_request: ResponsesRequest| -> ResponsesFuture {
            let position = order.fetch_add(1, Ordering::SeqCst) as u64;
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(60 - position * 20)).await;
                Ok::<_, anyhow::Error>(image_response(format!("image-{position}").as_bytes()))
            })
        })
    };

    let config = NodeConfig::default().with_concurrency(3);
    let node = node(config, slow_first, Arc::new(MemoryDebugLog::new()));
    let outputs = node
        .execute(&[photo(b"a"), photo(b"b"), photo(b"c")], &NodeParameters::default())
        .await
        .unwrap();

    let payloads: Vec<Vec<u8>> = outputs
        .iter()
        .map(|output| output.binary["data"].to_bytes().unwrap())
        .collect();
    assert_eq!(
        payloads,
        vec![b"image-0".to_vec(), b"image-1".to_vec(), b"image-2".to_vec()]
    );
}

#[tokio::test]
async fn unknown_style_uses_the_chibi_prompt() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
    let recorder = seen.clone();
    let dispatch: ResponsesFn = Arc::new(move |request: ResponsesRequest| -> ResponsesFuture {
        let prompt = match &request.input[0].content[0] {
            llmapi::InputContent::InputText { text } => text.clone(),
            other => panic!("unexpected content {other:?}"),
        };
        recorder.lock().unwrap().push(prompt);
        Box::pin(async { Ok::<_, anyhow::Error>(image_response(b"PNGDATA")) })
    });
    let node = node(NodeConfig::default(), dispatch, Arc::new(MemoryDebugLog::new()));

    let outputs = node
        .execute(&[photo(b"a")], &NodeParameters::binary("watercolor", "data"))
        .await
        .unwrap();

    assert!(outputs[0].is_success());
    assert_eq!(outputs[0].json["style"], json!("watercolor"));
    let chibi = photo_edit_lib::PromptCatalog::global().prompt(photo_edit_lib::StyleId::Chibi);
    assert_eq!(seen.lock().unwrap()[0], chibi);
}
