use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{event, Level};

use crate::{
    http::PixelaHttpClient,
    models::{
        format_date, Channel, Channels, CreateGraph, CreateUser, DateRange, Graphs, NewNotification,
        NewPixel, NewWebhook, Notifications, Pixel, PixelDates, PixelUpdate, PixelaOptions,
        PixelaResponse, Reply, Stats, SvgOptions, UpdateChannel, UpdateGraph, UpdateNotification,
        UpdateUser, WebhookCreated, Webhooks,
    },
};

/// Pixela client bound to one user.
///
/// Failed calls are not errors: the status body is returned and `is_success`
/// tells what happened. `Err` is reserved for transport and decoding failures.
pub struct Client {
    username: String,
    http_client: PixelaHttpClient,
}

impl Client {
    pub fn new(username: String, token: String) -> Result<Self> {
        Self::with_options(username, token, PixelaOptions::default())
    }

    pub fn with_options(username: String, token: String, options: PixelaOptions) -> Result<Self> {
        let http_client = PixelaHttpClient::new(token, options.api_url, options.timeout)?;
        Ok(Self {
            username,
            http_client,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    // User

    pub async fn create_user(&self, params: &CreateUser) -> Result<PixelaResponse> {
        #[derive(Serialize)]
        struct CreateUserBody<'a> {
            token: String,
            username: &'a str,
            #[serde(flatten)]
            params: &'a CreateUser,
        }

        let body = CreateUserBody {
            token: self.http_client.token()?,
            username: &self.username,
            params,
        };
        self.http_client.post("/v1/users", &body).await
    }

    /// Rotates the token. The new one is used from the next call on, and only if pixela accepted it.
    pub async fn update_user(&self, params: &UpdateUser) -> Result<PixelaResponse> {
        let res: PixelaResponse = self.http_client.put(&self.user_path(), params).await?;
        if res.is_success {
            self.http_client.set_token(params.new_token.clone())?;
            event!(Level::DEBUG, "Rotated pixela token for {}", self.username);
        }
        Ok(res)
    }

    pub async fn delete_user(&self) -> Result<PixelaResponse> {
        self.http_client.delete(&self.user_path()).await
    }

    // Channel

    pub async fn create_channel(&self, channel: &Channel) -> Result<PixelaResponse> {
        let url = format!("{}/channels", self.user_path());
        self.http_client.post(&url, channel).await
    }

    pub async fn get_channels(&self) -> Result<Reply<Channels>> {
        let url = format!("{}/channels", self.user_path());
        self.http_client.get(&url, None::<&()>).await
    }

    pub async fn update_channel(
        &self,
        channel_id: &str,
        params: &UpdateChannel,
    ) -> Result<PixelaResponse> {
        let url = format!("{}/channels/{}", self.user_path(), channel_id);
        self.http_client.put(&url, params).await
    }

    pub async fn delete_channel(&self, channel_id: &str) -> Result<PixelaResponse> {
        let url = format!("{}/channels/{}", self.user_path(), channel_id);
        self.http_client.delete(&url).await
    }

    // Graph

    pub async fn create_graph(&self, params: &CreateGraph) -> Result<PixelaResponse> {
        let url = format!("{}/graphs", self.user_path());
        self.http_client.post(&url, params).await
    }

    pub async fn get_graphs(&self) -> Result<Reply<Graphs>> {
        let url = format!("{}/graphs", self.user_path());
        self.http_client.get(&url, None::<&()>).await
    }

    /// Returns the SVG document as sent by pixela.
    pub async fn get_graph_svg(&self, graph_id: &str, options: &SvgOptions) -> Result<String> {
        self.http_client
            .get_text(&self.graph_path(graph_id), Some(options))
            .await
    }

    pub async fn update_graph(
        &self,
        graph_id: &str,
        params: &UpdateGraph,
    ) -> Result<PixelaResponse> {
        self.http_client.put(&self.graph_path(graph_id), params).await
    }

    pub async fn delete_graph(&self, graph_id: &str) -> Result<PixelaResponse> {
        self.http_client.delete(&self.graph_path(graph_id)).await
    }

    pub async fn get_pixel_dates(
        &self,
        graph_id: &str,
        range: &DateRange,
    ) -> Result<Reply<PixelDates>> {
        let url = format!("{}/pixels", self.graph_path(graph_id));
        self.http_client.get(&url, Some(range)).await
    }

    pub async fn get_stats(&self, graph_id: &str) -> Result<Reply<Stats>> {
        let url = format!("{}/stats", self.graph_path(graph_id));
        self.http_client.get(&url, None::<&()>).await
    }

    pub async fn stopwatch(&self, graph_id: &str) -> Result<PixelaResponse> {
        let url = format!("{}/stopwatch", self.graph_path(graph_id));
        self.http_client.post_empty(&url).await
    }

    // Pixel

    pub async fn create_pixel(&self, graph_id: &str, pixel: &NewPixel) -> Result<PixelaResponse> {
        self.http_client.post(&self.graph_path(graph_id), pixel).await
    }

    pub async fn get_pixel(&self, graph_id: &str, date: NaiveDate) -> Result<Reply<Pixel>> {
        self.http_client
            .get(&self.pixel_path(graph_id, date), None::<&()>)
            .await
    }

    pub async fn update_pixel(
        &self,
        graph_id: &str,
        date: NaiveDate,
        params: &PixelUpdate,
    ) -> Result<PixelaResponse> {
        self.http_client
            .put(&self.pixel_path(graph_id, date), params)
            .await
    }

    pub async fn increment_pixel(&self, graph_id: &str) -> Result<PixelaResponse> {
        let url = format!("{}/increment", self.graph_path(graph_id));
        self.http_client.put_empty(&url).await
    }

    pub async fn decrement_pixel(&self, graph_id: &str) -> Result<PixelaResponse> {
        let url = format!("{}/decrement", self.graph_path(graph_id));
        self.http_client.put_empty(&url).await
    }

    pub async fn delete_pixel(&self, graph_id: &str, date: NaiveDate) -> Result<PixelaResponse> {
        self.http_client
            .delete(&self.pixel_path(graph_id, date))
            .await
    }

    // Notification

    pub async fn create_notification(
        &self,
        graph_id: &str,
        params: &NewNotification,
    ) -> Result<PixelaResponse> {
        let url = format!("{}/notifications", self.graph_path(graph_id));
        self.http_client.post(&url, params).await
    }

    pub async fn get_notifications(&self, graph_id: &str) -> Result<Reply<Notifications>> {
        let url = format!("{}/notifications", self.graph_path(graph_id));
        self.http_client.get(&url, None::<&()>).await
    }

    pub async fn update_notification(
        &self,
        graph_id: &str,
        notification_id: &str,
        params: &UpdateNotification,
    ) -> Result<PixelaResponse> {
        let url = format!(
            "{}/notifications/{}",
            self.graph_path(graph_id),
            notification_id
        );
        self.http_client.put(&url, params).await
    }

    pub async fn delete_notification(
        &self,
        graph_id: &str,
        notification_id: &str,
    ) -> Result<PixelaResponse> {
        let url = format!(
            "{}/notifications/{}",
            self.graph_path(graph_id),
            notification_id
        );
        self.http_client.delete(&url).await
    }

    // Webhook

    pub async fn create_webhook(&self, params: &NewWebhook) -> Result<WebhookCreated> {
        let url = format!("{}/webhooks", self.user_path());
        self.http_client.post(&url, params).await
    }

    pub async fn get_webhooks(&self) -> Result<Reply<Webhooks>> {
        let url = format!("{}/webhooks", self.user_path());
        self.http_client.get(&url, None::<&()>).await
    }

    pub async fn invoke_webhook(&self, webhook_hash: &str) -> Result<PixelaResponse> {
        let url = format!("{}/webhooks/{}", self.user_path(), webhook_hash);
        self.http_client.post_empty(&url).await
    }

    pub async fn delete_webhook(&self, webhook_hash: &str) -> Result<PixelaResponse> {
        let url = format!("{}/webhooks/{}", self.user_path(), webhook_hash);
        self.http_client.delete(&url).await
    }
}

// Private methods
impl Client {
    fn user_path(&self) -> String {
        format!("/v1/users/{}", self.username)
    }

    fn graph_path(&self, graph_id: &str) -> String {
        format!("{}/graphs/{}", self.user_path(), graph_id)
    }

    fn pixel_path(&self, graph_id: &str, date: NaiveDate) -> String {
        format!("{}/{}", self.graph_path(graph_id), format_date(&date))
    }
}
