use serde::{Deserialize, Serialize};

/// The envelope the provider publishes for each batch of change
/// notifications: a `value` array of individual notifications.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    #[serde(default)]
    pub value: Vec<ChangeNotification>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotification {
    pub subscription_id: Option<String>,
    /// Echo of the `clientState` supplied at subscription time; consumers
    /// must match it against the account they act for before doing anything.
    pub client_state: Option<String>,
    pub change_type: Option<String>,
    pub lifecycle_event: Option<String>,
    pub resource: Option<String>,
    pub resource_data: Option<ResourceData>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(rename = "@odata.type")]
    pub odata_type: Option<String>,
    pub id: Option<String>,
}

impl ChangeNotification {
    pub fn is_message(&self) -> bool {
        self.resource_data
            .as_ref()
            .and_then(|data| data.odata_type.as_deref())
            .is_some_and(|t| t.eq_ignore_ascii_case("#microsoft.graph.message"))
    }

    pub fn requires_reauthorization(&self) -> bool {
        self.lifecycle_event.as_deref() == Some("reauthorizationRequired")
    }
}

#[cfg(test)]
mod tests {
    use super::NotificationEnvelope;

    #[test]
    fn parses_a_message_notification() {
        let raw = r##"{
            "value": [{
                "subscriptionId": "sub-1",
                "clientState": "user@example.com",
                "changeType": "created",
                "resource": "Users/u1/Messages/m1",
                "resourceData": {
                    "@odata.type": "#Microsoft.Graph.Message",
                    "id": "m1"
                }
            }]
        }"##;
        let envelope: NotificationEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.value.len(), 1);
        let notification = &envelope.value[0];
        assert!(notification.is_message());
        assert!(!notification.requires_reauthorization());
        assert_eq!(
            notification.client_state.as_deref(),
            Some("user@example.com")
        );
        assert_eq!(
            notification.resource_data.as_ref().unwrap().id.as_deref(),
            Some("m1")
        );
    }

    #[test]
    fn parses_a_lifecycle_notification() {
        let raw = r##"{
            "value": [{
                "subscriptionId": "sub-2",
                "lifecycleEvent": "reauthorizationRequired",
                "resourceData": {
                    "@odata.type": "#microsoft.graph.subscription"
                }
            }]
        }"##;
        let envelope: NotificationEnvelope = serde_json::from_str(raw).unwrap();
        let notification = &envelope.value[0];
        assert!(notification.requires_reauthorization());
        assert!(!notification.is_message());
    }

    #[test]
    fn empty_body_parses_to_no_notifications() {
        let envelope: NotificationEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.value.is_empty());
    }
}
