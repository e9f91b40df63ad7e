//! Integration tests using wiremock to simulate the Ncryptyr service.

use ncryptyr_client::endpoint::Endpoint;
use ncryptyr_client::transport::Transport;
use ncryptyr_client::types::*;
use ncryptyr_client::{Client, Error, Operation};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn vendor_json(body: serde_json::Value, media_type: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), media_type)
}

fn client(server: &MockServer) -> Client {
    Client::builder()
        .base_url(server.uri())
        .api_key("secret")
        .build()
        .unwrap()
}

/// Serves one connection with a hand-written status line and an empty body.
async fn raw_status_server(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        // Read the head and the (short) body before answering.
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request).to_lowercase();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        let response = format!(
            "{}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            status_line
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{}", addr)
}

fn encryption_key(id: &str) -> serde_json::Value {
    json!({
        "accountId": "acme",
        "id": id,
        "type": "AES",
        "createdDate": 1700000000000i64
    })
}

#[tokio::test]
async fn test_command_round_trip() {
    let mock_server = MockServer::start().await;
    let types = Operation::CreateEncryptionKey.media_types();

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", types.request))
        .and(header("api-key", "secret"))
        .and(body_json(json!({"id": "TestKey1"})))
        .respond_with(vendor_json(encryption_key("TestKey1"), types.response.unwrap()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let key = client(&mock_server)
        .create_encryption_key(&CreateEncryptionKeyCommand {
            id: "TestKey1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(key.id, "TestKey1");
    assert_eq!(key.account_id, "acme");
    assert_eq!(key.key_type, EncryptionKeyType::AES_128);
}

#[tokio::test]
async fn test_execute_with_explicit_media_types() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", "application/vnd.example.thing.v1+json"))
        .respond_with(vendor_json(
            json!({"id": "x"}),
            "application/vnd.example.thing-response.v1+json",
        ))
        .mount(&mock_server)
        .await;

    let result: serde_json::Value = client(&mock_server)
        .execute(
            &json!({"id": "x"}),
            true,
            "application/vnd.example.thing.v1+json",
            Some("application/vnd.example.thing-response.v1+json"),
        )
        .await
        .unwrap();

    assert_eq!(result, json!({"id": "x"}));
}

#[tokio::test]
async fn test_enroll_sends_no_credentials() {
    let mock_server = MockServer::start().await;
    let types = Operation::Enroll.media_types();

    let output = json!({
        "account": {
            "id": "acme",
            "contact": {"name": "QA", "email": "qa@example.com"},
            "createdDate": 1700000000000i64
        },
        "apiKey": {
            "accountId": "acme",
            "id": "master",
            "createdDate": 1700000000000i64,
            "secret": "s3cr3t"
        }
    });

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", types.request))
        .respond_with(vendor_json(output, types.response.unwrap()))
        .mount(&mock_server)
        .await;

    let command = EnrollCommand {
        id: "acme".to_string(),
        contact: Contact {
            name: "QA".to_string(),
            email: "qa@example.com".to_string(),
        },
    };
    let enrolled = client(&mock_server).enroll(&command).await.unwrap();
    assert_eq!(enrolled.account.contact, command.contact);
    assert_eq!(enrolled.api_key.secret, "s3cr3t");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("api-key").is_none());
    assert_eq!(requests[0].headers["user-agent"], "ncryptyr-client");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body,
        json!({"id": "acme", "contact": {"name": "QA", "email": "qa@example.com"}})
    );
}

#[tokio::test]
async fn test_enroll_then_set_api_key() {
    let mock_server = MockServer::start().await;
    let types = Operation::DescribeAccount.media_types();

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("api-key", "new-secret"))
        .and(body_json(json!({})))
        .respond_with(vendor_json(
            json!({
                "id": "acme",
                "contact": {"name": "QA", "email": "qa@example.com"},
                "createdDate": 1
            }),
            types.response.unwrap(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = Client::builder()
        .base_url(mock_server.uri())
        .without_environment()
        .build()
        .unwrap();
    client.set_api_key("new-secret").unwrap();

    let account = client.describe_account(None).await.unwrap();
    assert_eq!(account.id, "acme");
}

#[tokio::test]
async fn test_access_token_is_sent_as_bearer() {
    let mock_server = MockServer::start().await;
    let types = Operation::ListApiKeys.media_types();

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("authorization", "Bearer token"))
        .respond_with(vendor_json(
            json!([{"accountId": "acme", "id": "master", "createdDate": 1}]),
            types.response.unwrap(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .access_token("token")
        .without_environment()
        .build()
        .unwrap();

    let keys = client.list_api_keys(None).await.unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].id, "master");
}

#[tokio::test]
async fn test_content_type_mismatch_is_protocol_violation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(encryption_key("TestKey1")))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server)
        .describe_encryption_key(&DescribeEncryptionKeyCommand {
            id: "TestKey1".to_string(),
        })
        .await;

    match result {
        Err(Error::ProtocolViolation(message)) => {
            assert!(message.contains("describe-encryption-key-response.v1+json"));
            assert!(message.contains("application/json"));
        }
        _ => panic!("Expected ProtocolViolation, got {:?}", result),
    }
}

#[tokio::test]
async fn test_structured_errors_use_body_message() {
    let cases = [
        (400, "BadRequest"),
        (403, "Forbidden"),
        (404, "NotFound"),
        (500, "InternalError"),
    ];

    for (status, expected_kind) in cases {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({"message": "key is locked"})),
            )
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .export_encryption_key(&ExportEncryptionKeyCommand {
                id: "TestKey1".to_string(),
            })
            .await
            .unwrap_err();

        let kind = match &err {
            Error::BadRequest { .. } => "BadRequest",
            Error::Forbidden { .. } => "Forbidden",
            Error::NotFound { .. } => "NotFound",
            Error::InternalError { .. } => "InternalError",
            _ => "other",
        };
        assert_eq!(kind, expected_kind, "status {}", status);
        assert_eq!(err.message(), Some("key is locked"));
        assert_eq!(err.status().map(|s| s.as_u16()), Some(status));
    }
}

#[tokio::test]
async fn test_structured_error_falls_back_to_reason_phrase() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not here"))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server)
        .delete_api_key(&DeleteApiKeyCommand {
            id: "gone".to_string(),
        })
        .await;

    match result {
        Err(Error::NotFound { message }) => assert_eq!(message, "Not Found"),
        _ => panic!("Expected NotFound, got {:?}", result),
    }
}

#[tokio::test]
async fn test_structured_error_uses_server_reason_phrase() {
    let base_url = raw_status_server("HTTP/1.1 404 Encryption Key Missing").await;
    let client = Client::builder()
        .base_url(base_url)
        .api_key("secret")
        .build()
        .unwrap();

    let result = client.decrypt("b3BhcXVl").await;

    match result {
        Err(Error::NotFound { message }) => assert_eq!(message, "Encryption Key Missing"),
        _ => panic!("Expected NotFound, got {:?}", result),
    }
}

#[tokio::test]
async fn test_unknown_status_keeps_server_reason_phrase() {
    let base_url = raw_status_server("HTTP/1.1 599 Upstream Melted").await;
    let client = Client::builder()
        .base_url(base_url)
        .api_key("secret")
        .build()
        .unwrap();

    let result = client.decrypt("b3BhcXVl").await;

    match result {
        Err(Error::Unclassified { status, message }) => {
            assert_eq!(status.as_u16(), 599);
            assert_eq!(message, "Upstream Melted");
        }
        _ => panic!("Expected Unclassified, got {:?}", result),
    }
}

#[tokio::test]
async fn test_other_status_is_unclassified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "exists"})))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server)
        .create_api_key(&CreateApiKeyCommand {
            id: "TestKey".to_string(),
        })
        .await;

    match result {
        Err(Error::Unclassified { status, message }) => {
            assert_eq!(status.as_u16(), 409);
            assert_eq!(message, "exists");
        }
        _ => panic!("Expected Unclassified, got {:?}", result),
    }
}

#[tokio::test]
async fn test_delete_with_no_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header(
            "content-type",
            Operation::DeleteEncryptionKey.media_types().request,
        ))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .delete_encryption_key(&DeleteEncryptionKeyCommand {
            id: "TestKey2".to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_no_content_with_declared_response_type() {
    let mock_server = MockServer::start().await;
    let response_type = Operation::UpdateAccount.media_types().response.unwrap();

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(204).insert_header("content-type", response_type))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server)
        .update_account(&UpdateAccountCommand::default())
        .await;

    assert!(
        matches!(result, Err(Error::ProtocolViolation(_))),
        "Expected ProtocolViolation, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_undeserializable_body() {
    let mock_server = MockServer::start().await;
    let types = Operation::ListAccounts.media_types();

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(vendor_json(json!({"unexpected": true}), types.response.unwrap()))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).list_accounts(None).await.unwrap_err();

    assert!(err.is_protocol_violation());
    assert_eq!(err.raw_response(), Some(r#"{"unexpected":true}"#));
}

#[tokio::test]
async fn test_encrypt_sends_key_header_and_text_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/encrypt"))
        .and(header("encryption-key", "KeyA"))
        .and(header("content-type", "text/plain"))
        .and(header("api-key", "secret"))
        .and(body_string("hello"))
        .respond_with(ResponseTemplate::new(200).set_body_string("b3BhcXVl"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ciphertext = client(&mock_server).encrypt("KeyA", "hello").await.unwrap();
    assert_eq!(ciphertext, "b3BhcXVl");
}

#[tokio::test]
async fn test_encrypt_failure_is_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/encrypt"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Unknown key KeyA"})),
        )
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).encrypt("KeyA", "hello").await;

    match result {
        Err(Error::NotFound { message }) => assert_eq!(message, "Unknown key KeyA"),
        _ => panic!("Expected NotFound, got {:?}", result),
    }
}

#[tokio::test]
async fn test_decrypt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/decrypt"))
        .and(header("api-key", "secret"))
        .and(body_string("b3BhcXVl"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let plaintext = client(&mock_server).decrypt("b3BhcXVl").await.unwrap();
    assert_eq!(plaintext, "hello");

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("encryption-key").is_none());
}

#[tokio::test]
async fn test_get_request_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let endpoint = Endpoint::new(mock_server.uri().parse().unwrap());
    let transport = Transport::new(endpoint.base_url().clone()).unwrap();
    let request = endpoint
        .request("/keys")
        .get()
        .with_parameter("id", Some(" abc "))
        .with_parameter("idBeginsWith", None)
        .build();

    let response = transport.send(&request).await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.text().unwrap(), "ok");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("id=abc"));
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_distinct() {
    // Nothing listens on the discard port.
    let client = Client::builder()
        .base_url("http://127.0.0.1:9")
        .api_key("secret")
        .build()
        .unwrap();

    let err = client.decrypt("anything").await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got {:?}", err);
    assert!(!err.is_structured());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/encrypt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("cipher"))
        .expect(8)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move { client.encrypt("KeyA", &format!("message {}", i)).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "cipher");
    }
}
