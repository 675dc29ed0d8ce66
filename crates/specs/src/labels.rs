//! Labels shared by every resource the controller manages.
//!
//! The same set is used as the StatefulSet selector, so it must never change
//! for the life of a GameServer.

use std::collections::BTreeMap;

/// Value of `app.kubernetes.io/name` on managed resources
pub const OPERATOR_NAME: &str = "gameserver-operator";

/// Value of `app.kubernetes.io/managed-by`; also the server-side apply field manager
pub const CONTROLLER_NAME: &str = "gameserver-controller";

pub const LABEL_NAME: &str = "app.kubernetes.io/name";
pub const LABEL_INSTANCE: &str = "app.kubernetes.io/instance";
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Selector labels for the GameServer named `instance`.
pub fn selector_labels(instance: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (LABEL_NAME.to_string(), OPERATOR_NAME.to_string()),
        (LABEL_INSTANCE.to_string(), instance.to_string()),
        (LABEL_MANAGED_BY.to_string(), CONTROLLER_NAME.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_labels() {
        let labels = selector_labels("valheim-1");

        assert_eq!(labels.len(), 3);
        assert_eq!(labels[LABEL_NAME], "gameserver-operator");
        assert_eq!(labels[LABEL_INSTANCE], "valheim-1");
        assert_eq!(labels[LABEL_MANAGED_BY], "gameserver-controller");
    }
}
