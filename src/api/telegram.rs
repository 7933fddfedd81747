use crate::models::{
    InlineKeyboardMarkup, Message, SendMessageRequest, SetWebhookRequest, TelegramResponse, Update,
};
use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Clone)]
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new(token: String) -> Self {
        Self::new_with_base_url(format!("https://api.telegram.org/bot{}", token))
    }

    pub fn new_with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let resp: TelegramResponse<T> = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        if !resp.ok {
            let error_msg = resp
                .description
                .unwrap_or_else(|| format!("{method} failed"));
            return Err(anyhow!("Telegram API error: {}", error_msg));
        }

        Ok(resp.result)
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        reply_to: Option<i64>,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<i64> {
        let body = SendMessageRequest {
            chat_id,
            text: text.to_string(),
            reply_to_message_id: reply_to,
            parse_mode: Some("HTML".to_string()),
            reply_markup,
        };

        let message: Message = self
            .call("sendMessage", &body)
            .await?
            .ok_or_else(|| anyhow!("Telegram API error: missing result in response"))?;
        Ok(message.message_id)
    }

    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        let body = SetWebhookRequest { url, secret_token };
        self.call::<_, serde_json::Value>("setWebhook", &body)
            .await?;
        Ok(())
    }

    pub async fn delete_webhook(&self) -> Result<()> {
        self.call::<_, serde_json::Value>("deleteWebhook", &serde_json::json!({}))
            .await?;
        Ok(())
    }

    pub async fn get_updates(&self, offset: Option<i64>, timeout: i32) -> Result<Vec<Update>> {
        let url = format!("{}/getUpdates", self.base_url);
        let mut params = vec![("timeout", timeout.to_string())];
        if let Some(offset) = offset {
            params.push(("offset", offset.to_string()));
        }

        let resp: TelegramResponse<Vec<Update>> = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await?
            .json()
            .await?;

        if !resp.ok {
            let error_msg = resp
                .description
                .unwrap_or_else(|| "getUpdates failed".to_string());
            return Err(anyhow!("Telegram API error: {}", error_msg));
        }

        Ok(resp.result.unwrap_or_default())
    }
}
