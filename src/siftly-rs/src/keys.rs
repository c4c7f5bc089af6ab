use crate::request::Request;
use crate::{Client, Key, KeyRequest, KeyUpdate, KeysResults, Result};
use reqwest::StatusCode;

impl Client {
    pub async fn create_key(&self, request: &KeyRequest) -> Result<Key> {
        self.execute(
            Request::post("create_key", "/keys")
                .with_body(request)
                .accept(&[StatusCode::CREATED]),
        )
        .await
    }

    /// Look up a key by its value or uid
    pub async fn get_key(&self, key: &str) -> Result<Key> {
        self.execute(Request::get("get_key", format!("/keys/{}", urlencoding::encode(key))))
            .await
    }

    pub async fn get_keys(&self) -> Result<KeysResults> {
        self.execute(Request::get("get_keys", "/keys")).await
    }

    pub async fn update_key(&self, key: &str, update: &KeyUpdate) -> Result<Key> {
        self.execute(
            Request::patch("update_key", format!("/keys/{}", urlencoding::encode(key)))
                .with_body(update),
        )
        .await
    }

    pub async fn delete_key(&self, key: &str) -> Result<()> {
        self.execute_no_content(
            Request::delete("delete_key", format!("/keys/{}", urlencoding::encode(key)))
                .accept(&[StatusCode::NO_CONTENT]),
        )
        .await
    }
}
