use std::time::Duration;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{
    json::JsonString, serde_as, skip_serializing_none, DeserializeAs, DisplayFromStr, PickFirst,
    SerializeAs,
};

/// Pixela exchanges dates as `yyyyMMdd`.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Formats a date the way it appears in pixel paths.
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `serde_as` adapter for `yyyyMMdd` dates.
pub struct PixelaDate;

impl SerializeAs<NaiveDate> for PixelaDate {
    fn serialize_as<S>(source: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&source.format(DATE_FORMAT))
    }
}

impl<'de> DeserializeAs<'de, NaiveDate> for PixelaDate {
    fn deserialize_as<D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// `serde_as` adapter sending booleans as `"yes"` / `"no"`.
pub struct YesNo;

impl SerializeAs<bool> for YesNo {
    fn serialize_as<S>(source: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(if *source { "yes" } else { "no" })
    }
}

/// Options to use when creating the client, they will override default values, if they exist.
///
/// The default value for api_url is https://pixe.la
/// The default timeout is read from PIXELA_TIMEOUT_MS, or 10s.
#[derive(Debug, Clone, Default)]
pub struct PixelaOptions {
    pub api_url: Option<String>,
    pub timeout: Option<Duration>,
}

/// Status body returned by every mutating endpoint, and by any endpoint on failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelaResponse {
    pub message: String,
    pub is_success: bool,
}

/// Answer of a data endpoint: either the data or the status body explaining why not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply<T> {
    Failure(PixelaResponse),
    Success(T),
}

// Data bodies never carry `isSuccess`, so the status body is tried first.
// Decoding errors come from `T`, naming the field that did not match.
impl<'de, T> Deserialize<'de> for Reply<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        if let Ok(res) = PixelaResponse::deserialize(&value) {
            return Ok(Reply::Failure(res));
        }
        T::deserialize(value)
            .map(Reply::Success)
            .map_err(serde::de::Error::custom)
    }
}

impl<T> Reply<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Reply::Success(data) => Some(data),
            Reply::Failure(_) => None,
        }
    }

    /// Turns a failure body into an error carrying the service message.
    pub fn into_result(self) -> anyhow::Result<T> {
        match self {
            Reply::Success(data) => Ok(data),
            Reply::Failure(res) => Err(anyhow!("pixela error: {}", res.message)),
        }
    }
}

// Enumerations

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Shibafu,
    Momiji,
    Sora,
    Ichou,
    Ajisai,
    Kuro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphType {
    Int,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfSufficient {
    Increment,
    Decrement,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Short,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationTarget {
    Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Condition {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "multipleOf")]
    MultipleOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookType {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Slack,
}

// User

#[serde_as]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[serde_as(as = "YesNo")]
    pub agree_terms_of_service: bool,
    #[serde_as(as = "YesNo")]
    pub not_minor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thanks_code: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub new_token: String,
    pub thanks_code: Option<String>,
}

// Channel

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackDetail {
    pub url: String,
    pub user_name: String,
    pub channel_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub r#type: ChannelType,
    pub detail: SlackDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Channels {
    pub channels: Vec<Channel>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChannel {
    pub name: Option<String>,
    pub r#type: Option<ChannelType>,
    pub detail: Option<SlackDetail>,
}

// Graph

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub r#type: GraphType,
    pub color: Color,
    pub timezone: String,
    #[serde(rename = "purgeCacheURLs", default)]
    pub purge_cache_urls: Vec<String>,
    pub self_sufficient: SelfSufficient,
    pub is_secret: bool,
    pub publish_optional_data: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Graphs {
    pub graphs: Vec<Graph>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGraph {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub r#type: GraphType,
    pub color: Color,
    pub timezone: Option<String>,
    pub self_sufficient: Option<SelfSufficient>,
    pub is_secret: Option<bool>,
    pub publish_optional_data: Option<bool>,
}

impl CreateGraph {
    pub fn new(id: String, name: String, unit: String, r#type: GraphType, color: Color) -> Self {
        Self {
            id,
            name,
            unit,
            r#type,
            color,
            timezone: None,
            self_sufficient: None,
            is_secret: None,
            publish_optional_data: None,
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGraph {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub color: Option<Color>,
    pub timezone: Option<String>,
    #[serde(rename = "purgeCacheURLs")]
    pub purge_cache_urls: Option<Vec<String>>,
    pub self_sufficient: Option<SelfSufficient>,
    pub is_secret: Option<bool>,
    pub publish_optional_data: Option<bool>,
}

/// Query of the graph SVG endpoint.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize)]
pub struct SvgOptions {
    #[serde_as(as = "Option<PixelaDate>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<DisplayMode>,
}

/// Query of the pixel dates endpoint, both bounds inclusive.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize)]
pub struct DateRange {
    #[serde_as(as = "Option<PixelaDate>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde_as(as = "Option<PixelaDate>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PixelDates {
    #[serde_as(as = "Vec<PixelaDate>")]
    pub pixels: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_pixels_count: u64,
    pub max_quantity: f64,
    pub min_quantity: f64,
    pub total_quantity: f64,
    pub avg_quantity: f64,
    pub todays_quantity: f64,
}

// Pixel

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pixel {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub quantity: f64,
    #[serde_as(as = "Option<JsonString>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_data: Option<serde_json::Value>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPixel {
    #[serde_as(as = "PixelaDate")]
    pub date: NaiveDate,
    #[serde_as(as = "DisplayFromStr")]
    pub quantity: f64,
    #[serde_as(as = "Option<JsonString>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_data: Option<serde_json::Value>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelUpdate {
    #[serde_as(as = "DisplayFromStr")]
    pub quantity: f64,
    #[serde_as(as = "Option<JsonString>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_data: Option<serde_json::Value>,
}

// Notification

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub name: String,
    pub target: NotificationTarget,
    pub condition: Condition,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub threshold: f64,
    #[serde(rename = "channelID")]
    pub channel_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Notifications {
    pub notifications: Vec<Notification>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub id: String,
    pub name: String,
    pub target: NotificationTarget,
    pub condition: Condition,
    #[serde_as(as = "DisplayFromStr")]
    pub threshold: f64,
    #[serde(rename = "channelID")]
    pub channel_id: String,
}

#[skip_serializing_none]
#[serde_as]
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotification {
    pub name: Option<String>,
    pub target: Option<NotificationTarget>,
    pub condition: Option<Condition>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub threshold: Option<f64>,
    #[serde(rename = "channelID")]
    pub channel_id: Option<String>,
}

// Webhook

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebhook {
    #[serde(rename = "graphID")]
    pub graph_id: String,
    pub r#type: WebhookType,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookCreated {
    #[serde(default)]
    pub webhook_hash: Option<String>,
    pub message: String,
    pub is_success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub webhook_hash: String,
    #[serde(rename = "graphID")]
    pub graph_id: String,
    pub r#type: WebhookType,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Webhooks {
    pub webhooks: Vec<Webhook>,
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_create_user_sends_yes_no() {
        let params = CreateUser {
            agree_terms_of_service: true,
            not_minor: false,
            thanks_code: None,
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "agreeTermsOfService": "yes", "notMinor": "no" })
        );
    }

    #[test]
    fn test_new_pixel_stringifies_quantity_and_data() {
        let params = NewPixel {
            date: date(2018, 9, 15),
            quantity: 5.0,
            optional_data: Some(json!({ "key": "value" })),
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "date": "20180915", "quantity": "5", "optionalData": "{\"key\":\"value\"}" })
        );

        let params = PixelUpdate {
            quantity: 6.25,
            optional_data: None,
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "quantity": "6.25" })
        );
    }

    #[test]
    fn test_pixel_accepts_string_or_number_quantity() {
        let pixel: Pixel =
            serde_json::from_value(json!({ "quantity": "5", "optionalData": "{\"key\":\"value\"}" }))
                .unwrap();
        assert_eq!(pixel.quantity, 5.0);
        assert_eq!(pixel.optional_data, Some(json!({ "key": "value" })));

        let pixel: Pixel = serde_json::from_value(json!({ "quantity": 7 })).unwrap();
        assert_eq!(pixel.quantity, 7.0);
        assert_eq!(pixel.optional_data, None);
    }

    #[test]
    fn test_update_graph_skips_missing_fields() {
        let params = UpdateGraph {
            color: Some(Color::Shibafu),
            purge_cache_urls: Some(vec!["https://camo.githubusercontent.com/xxx".to_string()]),
            ..UpdateGraph::default()
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "color": "shibafu",
                "purgeCacheURLs": ["https://camo.githubusercontent.com/xxx"]
            })
        );
    }

    #[test]
    fn test_notification_wire_names() {
        let params = NewNotification {
            id: "rule".to_string(),
            name: "rule".to_string(),
            target: NotificationTarget::Quantity,
            condition: Condition::MultipleOf,
            threshold: 3.0,
            channel_id: "my-channel".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "id": "rule",
                "name": "rule",
                "target": "quantity",
                "condition": "multipleOf",
                "threshold": "3",
                "channelID": "my-channel"
            })
        );
    }

    #[test]
    fn test_reply_picks_failure_body() {
        let reply: Reply<Graphs> =
            serde_json::from_value(json!({ "message": "User `x` does not exist.", "isSuccess": false }))
                .unwrap();
        assert!(!reply.is_success());
        assert!(reply.into_result().is_err());

        let reply: Reply<PixelDates> =
            serde_json::from_value(json!({ "pixels": ["20180101", "20181204"] })).unwrap();
        assert_eq!(
            reply.success().map(|d| d.pixels),
            Some(vec![date(2018, 1, 1), date(2018, 12, 4)])
        );
    }

    #[test]
    fn test_reply_reports_data_error() {
        let err = serde_json::from_value::<Reply<Stats>>(json!({
            "totalPixelsCount": 4,
            "maxQuantity": 7,
            "minQuantity": 4,
            "totalQuantity": 25,
            "avgQuantity": 6.25
        }))
        .unwrap_err();
        assert!(err.to_string().contains("todaysQuantity"));
    }

    #[test]
    fn test_update_notification_skips_missing_fields() {
        let params = UpdateNotification {
            threshold: Some(2.5),
            ..UpdateNotification::default()
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "threshold": "2.5" })
        );
    }

    #[test]
    fn test_date_range_query() {
        let range = DateRange {
            from: Some(date(2018, 1, 1)),
            to: None,
        };
        assert_eq!(serde_json::to_value(&range).unwrap(), json!({ "from": "20180101" }));
        assert_eq!(format_date(&date(2019, 7, 30)), "20190730");
    }
}
