//! Persistent storage for the game server data directory.

use std::collections::BTreeMap;

use crds::{GameServer, GameServerSpec};
use k8s_openapi::{
    api::core::v1::{
        PersistentVolumeClaim, PersistentVolumeClaimSpec, VolumeMount,
        VolumeResourceRequirements,
    },
    apimachinery::pkg::{api::resource::Quantity, apis::meta::v1::ObjectMeta},
};

use crate::error::SpecError;

/// Name of the claim template and of the volume mount backed by it
pub const DATA_VOLUME_NAME: &str = "data";
pub const DATA_MOUNT_PATH: &str = "/data";
pub const DEFAULT_STORAGE_SIZE: &str = "10Gi";

const ACCESS_MODE_SINGLE_WRITER: &str = "ReadWriteOnce";

const QUANTITY_SUFFIXES: &[&str] = &[
    "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "m", "k", "M", "G", "T", "P", "E",
];

/// Storage is on unless the spec explicitly disables it.
pub fn storage_enabled(spec: &GameServerSpec) -> bool {
    spec.storage
        .as_ref()
        .and_then(|storage| storage.enabled)
        .unwrap_or(true)
}

/// Builds the volume claim template for the data volume, if storage is enabled.
///
/// The claim is always named `data`; the size falls back to 10Gi.
pub fn build_storage_claim(gs: &GameServer) -> Result<Option<PersistentVolumeClaim>, SpecError> {
    if !storage_enabled(&gs.spec) {
        return Ok(None);
    }

    let storage = gs.spec.storage.as_ref();
    let size = storage
        .and_then(|s| s.size.as_deref())
        .filter(|size| !size.is_empty())
        .unwrap_or(DEFAULT_STORAGE_SIZE);
    let size = parse_quantity(size).ok_or_else(|| SpecError::InvalidStorageSize(size.to_string()))?;

    Ok(Some(PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: Some(DATA_VOLUME_NAME.to_string()),
            namespace: gs.metadata.namespace.clone(),
            ..Default::default()
        },
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec![ACCESS_MODE_SINGLE_WRITER.to_string()]),
            resources: Some(VolumeResourceRequirements {
                requests: Some(BTreeMap::from([("storage".to_string(), size)])),
                ..Default::default()
            }),
            storage_class_name: storage.and_then(|s| s.storage_class_name.clone()),
            ..Default::default()
        }),
        ..Default::default()
    }))
}

/// Mount of the data claim into the game server container.
pub fn data_volume_mount() -> VolumeMount {
    VolumeMount {
        name: DATA_VOLUME_NAME.to_string(),
        mount_path: DATA_MOUNT_PATH.to_string(),
        ..Default::default()
    }
}

/// Validates a Kubernetes quantity string such as "10Gi", "500m", "+1.5" or "1e3".
///
/// Accepts the Kubernetes grammar: an optional sign, a decimal number, then a
/// binary suffix, a decimal suffix or a decimal exponent.
pub(crate) fn parse_quantity(value: &str) -> Option<Quantity> {
    let unsigned = value.strip_prefix(&['+', '-'][..]).unwrap_or(value);
    let number_len = unsigned
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(unsigned.len());
    let (number, suffix) = unsigned.split_at(number_len);

    (valid_number(number) && valid_suffix(suffix)).then(|| Quantity(value.to_string()))
}

fn all_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

fn valid_number(number: &str) -> bool {
    match number.split_once('.') {
        Some((whole, fraction)) => {
            (!whole.is_empty() || !fraction.is_empty()) && all_digits(whole) && all_digits(fraction)
        }
        None => !number.is_empty() && all_digits(number),
    }
}

fn valid_suffix(suffix: &str) -> bool {
    if suffix.is_empty() || QUANTITY_SUFFIXES.contains(&suffix) {
        return true;
    }
    let Some(exponent) = suffix.strip_prefix(&['e', 'E'][..]) else {
        return false;
    };
    let exponent = exponent.strip_prefix(&['+', '-'][..]).unwrap_or(exponent);
    !exponent.is_empty() && all_digits(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::new_game_server;
    use crds::StorageSpec;

    #[test]
    fn test_storage_enabled_by_default() {
        let gs = new_game_server(|_| {});
        assert!(storage_enabled(&gs.spec));

        let gs = new_game_server(|gs| gs.spec.storage = Some(StorageSpec::default()));
        assert!(storage_enabled(&gs.spec));
    }

    #[test]
    fn test_storage_disabled_emits_no_claim() {
        let gs = new_game_server(|gs| {
            gs.spec.storage = Some(StorageSpec {
                enabled: Some(false),
                ..Default::default()
            });
        });

        assert!(!storage_enabled(&gs.spec));
        assert_eq!(build_storage_claim(&gs).unwrap(), None);
    }

    #[test]
    fn test_claim_uses_default_size() {
        let gs = new_game_server(|_| {});

        let claim = build_storage_claim(&gs).unwrap().unwrap();
        let spec = claim.spec.unwrap();

        assert_eq!(claim.metadata.name.as_deref(), Some("data"));
        assert_eq!(spec.access_modes, Some(vec!["ReadWriteOnce".to_string()]));
        assert_eq!(
            spec.resources.unwrap().requests.unwrap()["storage"],
            Quantity("10Gi".to_string())
        );
        assert_eq!(spec.storage_class_name, None);
    }

    #[test]
    fn test_claim_uses_spec_size_and_class() {
        let gs = new_game_server(|gs| {
            gs.spec.storage = Some(StorageSpec {
                enabled: Some(true),
                size: Some("50Gi".to_string()),
                storage_class_name: Some("fast-ssd".to_string()),
            });
        });

        let spec = build_storage_claim(&gs).unwrap().unwrap().spec.unwrap();

        assert_eq!(
            spec.resources.unwrap().requests.unwrap()["storage"],
            Quantity("50Gi".to_string())
        );
        assert_eq!(spec.storage_class_name.as_deref(), Some("fast-ssd"));
    }

    #[test]
    fn test_malformed_size_is_configuration_error() {
        let gs = new_game_server(|gs| {
            gs.spec.storage = Some(StorageSpec {
                size: Some("ten gigs".to_string()),
                ..Default::default()
            });
        });

        assert_eq!(
            build_storage_claim(&gs),
            Err(SpecError::InvalidStorageSize("ten gigs".to_string()))
        );
    }

    #[test]
    fn test_parse_quantity() {
        for valid in ["10Gi", "512Mi", "1", "0.5", "500m", "1.5G", ".5", "1E"] {
            assert!(parse_quantity(valid).is_some(), "{valid} should parse");
        }
        for invalid in ["", "Gi", "10 Gi", "ten", "1.2.3Gi", "10Gb", ".", "+", "1e3Gi"] {
            assert!(parse_quantity(invalid).is_none(), "{invalid} should not parse");
        }
    }

    #[test]
    fn test_parse_quantity_signs_and_exponents() {
        for valid in ["1e3", "1E3", "+5Gi", "-1Gi", "2.5e-3", "1E+6"] {
            assert!(parse_quantity(valid).is_some(), "{valid} should parse");
        }
        for invalid in ["1e", "1e+", "e3", "++5Gi", "5Gi+"] {
            assert!(parse_quantity(invalid).is_none(), "{invalid} should not parse");
        }
    }

    #[test]
    fn test_exponent_storage_size_is_accepted() {
        let gs = new_game_server(|gs| {
            gs.spec.storage = Some(StorageSpec {
                size: Some("1e10".to_string()),
                ..Default::default()
            });
        });

        let spec = build_storage_claim(&gs).unwrap().unwrap().spec.unwrap();
        assert_eq!(
            spec.resources.unwrap().requests.unwrap()["storage"],
            Quantity("1e10".to_string())
        );
    }
}
