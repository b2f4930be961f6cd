// ── Device identity resolution ──
//
// Layered, lowest precedence first: sysDescr parsing, vendor OIDs
// behind vendor detection, then user-configured OIDs per field. Reads
// here never fail the refresh; an error simply contributes nothing.

use tracing::debug;

use super::{get_optional, get_text, walk_column};
use crate::config::{CustomOids, OidField};
use crate::mib;
use crate::model::{DeviceIdentity, Uptime};
use crate::oid::Oid;
use crate::transport::{SnmpTransport, SnmpValue};
use crate::vendor::{VendorTag, detect_vendor};

/// What sysDescr alone says about the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDescription {
    pub manufacturer: Option<String>,
    pub firmware: Option<String>,
}

/// Split sysDescr on commas: the second field is the firmware. The
/// manufacturer is the first field with the model removed, or all but
/// its last word when the model does not appear in it.
pub fn parse_system_description(description: &str, model_hint: Option<&str>) -> ParsedDescription {
    let description = description.trim();
    if description.is_empty() {
        return ParsedDescription::default();
    }
    let fields: Vec<&str> = description.split(',').map(str::trim).collect();
    let firmware = fields
        .get(1)
        .filter(|f| !f.is_empty())
        .map(|f| (*f).to_owned());
    let head = fields.first().copied().unwrap_or_default();

    let manufacturer = match model_hint.filter(|hint| !hint.is_empty() && head.contains(hint)) {
        Some(hint) => Some(head.replace(hint, "").trim().to_owned()),
        None => {
            let tokens: Vec<&str> = head.split_whitespace().collect();
            (tokens.len() > 1).then(|| tokens[..tokens.len() - 1].join(" "))
        }
    }
    .filter(|m| !m.is_empty());

    ParsedDescription {
        manufacturer,
        firmware,
    }
}

/// First non-empty entPhysicalModelName.
pub async fn entity_model_hint<T: SnmpTransport>(transport: &T) -> Option<String> {
    walk_column(transport, mib::ENT_PHYSICAL_MODEL_NAME)
        .await
        .iter()
        .find_map(|row| row.value.non_empty_text())
}

/// Derive manufacturer, model, firmware and hostname.
///
/// `system_name` is the sysName already read by the caller.
pub async fn resolve_identity<T: SnmpTransport>(
    transport: &T,
    system_description: Option<&str>,
    system_name: Option<&str>,
    model_hint: Option<&str>,
    custom: &CustomOids,
) -> DeviceIdentity {
    let description = system_description.unwrap_or_default();
    let parsed = parse_system_description(description, model_hint);
    let mut identity = DeviceIdentity {
        manufacturer: parsed.manufacturer,
        model: model_hint.map(ToOwned::to_owned),
        firmware: parsed.firmware,
        hostname: system_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned),
        system_description: system_description.map(ToOwned::to_owned),
        vendor: None,
    };

    // CBS chassis are often only recognisable from the entity model
    let hinted_cbs = model_hint.is_some_and(|hint| hint.to_lowercase().contains("cbs"));
    if hinted_cbs || description.to_lowercase().contains("cbs") {
        override_with(&mut identity.firmware, transport, mib::CISCO_CBS_SOFTWARE_REV).await;
    }

    match detect_vendor(None, Some(description)) {
        Some(VendorTag::Zyxel) => {
            override_with(&mut identity.manufacturer, transport, mib::ZYXEL_MFG_NAME).await;
            override_with(&mut identity.firmware, transport, mib::ZYXEL_FIRMWARE_VERSION).await;
        }
        Some(VendorTag::Mikrotik) => {
            identity.manufacturer = Some(VendorTag::Mikrotik.label().to_owned());
            override_with(&mut identity.firmware, transport, mib::MIKROTIK_SOFTWARE_VERSION).await;
            override_with(&mut identity.model, transport, mib::MIKROTIK_MODEL).await;
        }
        _ => {}
    }

    for (field, slot) in [
        (OidField::Manufacturer, &mut identity.manufacturer),
        (OidField::Model, &mut identity.model),
        (OidField::Firmware, &mut identity.firmware),
        (OidField::Hostname, &mut identity.hostname),
    ] {
        if let Some(oid) = custom.get(field) {
            if let Some(value) = get_text(transport, oid).await {
                debug!(device = transport.target(), %field, "custom OID override");
                *slot = Some(value);
            }
        }
    }

    identity.vendor = detect_vendor(identity.manufacturer.as_deref(), system_description);
    identity
}

/// Read uptime from the custom OID when it answers, else sysUpTime.
pub async fn read_uptime<T: SnmpTransport>(transport: &T, custom: &CustomOids) -> Option<Uptime> {
    if let Some(oid) = custom.get(OidField::Uptime) {
        if let Some(uptime) = get_optional(transport, oid).await.and_then(uptime_from) {
            return Some(uptime);
        }
    }
    get_optional(transport, &Oid::from_slice(mib::SYS_UPTIME))
        .await
        .and_then(uptime_from)
}

fn uptime_from(value: SnmpValue) -> Option<Uptime> {
    match value {
        SnmpValue::TimeTicks(ticks) => Some(Uptime::Ticks(u64::from(ticks))),
        SnmpValue::Integer(_) | SnmpValue::Unsigned(_) => value.as_u64().map(Uptime::Ticks),
        other => other.non_empty_text().map(Uptime::Text),
    }
}

async fn override_with<T: SnmpTransport>(slot: &mut Option<String>, transport: &T, oid: &[u32]) {
    if let Some(value) = get_text(transport, &Oid::from_slice(oid)).await {
        *slot = Some(value);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::oid::parse_oid;
    use crate::transport::{MockAgent, MockFault};

    fn oid(column: &[u32]) -> Oid {
        Oid::from_slice(column)
    }

    #[test]
    fn description_with_model_hint() {
        let parsed = parse_system_description("Acme SW-24 Switch, 2.4.1, build 77", Some("SW-24"));
        assert_eq!(parsed.manufacturer.as_deref(), Some("Acme  Switch"));
        assert_eq!(parsed.firmware.as_deref(), Some("2.4.1"));
    }

    #[test]
    fn description_without_model_hint_drops_last_token() {
        let parsed = parse_system_description("Netgear Smart Switch GS108T", None);
        assert_eq!(parsed.manufacturer.as_deref(), Some("Netgear Smart Switch"));
        assert_eq!(parsed.firmware, None);

        let single = parse_system_description("RouterOS", None);
        assert_eq!(single, ParsedDescription::default());
        assert_eq!(parse_system_description("   ", None), ParsedDescription::default());
    }

    #[tokio::test]
    async fn mikrotik_gate_forces_manufacturer() {
        let agent = MockAgent::new("192.0.2.1:161")
            .with(oid(mib::MIKROTIK_SOFTWARE_VERSION), SnmpValue::text("7.20.6"))
            .with(oid(mib::MIKROTIK_MODEL), SnmpValue::text("CRS305-1G-4S+"));
        let identity = resolve_identity(
            &agent,
            Some("RouterOS CRS305-1G-4S+"),
            Some("core-sw"),
            None,
            &CustomOids::default(),
        )
        .await;
        assert_eq!(identity.manufacturer.as_deref(), Some("MikroTik"));
        assert_eq!(identity.firmware.as_deref(), Some("7.20.6"));
        assert_eq!(identity.model.as_deref(), Some("CRS305-1G-4S+"));
        assert_eq!(identity.hostname.as_deref(), Some("core-sw"));
        assert_eq!(identity.vendor, Some(VendorTag::Mikrotik));
    }

    #[tokio::test]
    async fn cbs_firmware_from_entity_revision() {
        let agent = MockAgent::new("192.0.2.1:161")
            .with(oid(mib::CISCO_CBS_SOFTWARE_REV), SnmpValue::text("3.3.0.16 "));
        let identity = resolve_identity(
            &agent,
            Some("CBS350-24P-4G 24-Port Gigabit PoE Managed Switch"),
            None,
            Some("CBS350-24P-4G"),
            &CustomOids::default(),
        )
        .await;
        assert_eq!(identity.firmware.as_deref(), Some("3.3.0.16"));
        assert_eq!(identity.vendor, Some(VendorTag::Cisco));
    }

    #[tokio::test]
    async fn cbs_model_hint_alone_gates_firmware_read() {
        let agent = MockAgent::new("192.0.2.1:161")
            .with(oid(mib::CISCO_CBS_SOFTWARE_REV), SnmpValue::text("3.3.0.16"));
        let identity = resolve_identity(
            &agent,
            Some("24-Port Gigabit PoE Managed Switch, 3.2.0.84"),
            None,
            Some("CBS350-24P-4G"),
            &CustomOids::default(),
        )
        .await;
        assert_eq!(identity.firmware.as_deref(), Some("3.3.0.16"));
        assert_eq!(identity.model.as_deref(), Some("CBS350-24P-4G"));
    }

    #[tokio::test]
    async fn cbs_gate_keeps_description_firmware_when_read_fails() {
        let agent = MockAgent::new("192.0.2.1:161");
        agent.fault(oid(mib::CISCO_CBS_SOFTWARE_REV), MockFault::Timeout);
        let identity = resolve_identity(
            &agent,
            Some("24-Port Gigabit PoE Managed Switch, 3.2.0.84"),
            None,
            Some("CBS350-24P-4G"),
            &CustomOids::default(),
        )
        .await;
        assert_eq!(identity.firmware.as_deref(), Some("3.2.0.84"));
    }

    #[tokio::test]
    async fn failed_vendor_reads_are_swallowed() {
        let agent = MockAgent::new("192.0.2.1:161");
        agent.fault(oid(mib::ZYXEL_MFG_NAME), MockFault::Timeout);
        agent.fault(oid(mib::ZYXEL_FIRMWARE_VERSION), MockFault::Protocol("genErr"));
        let identity = resolve_identity(
            &agent,
            Some("Zyxel GS1920-24, V4.50(AAOB.3)"),
            None,
            None,
            &CustomOids::default(),
        )
        .await;
        assert_eq!(identity.manufacturer.as_deref(), Some("Zyxel"));
        assert_eq!(identity.firmware.as_deref(), Some("V4.50(AAOB.3)"));
        assert_eq!(identity.vendor, Some(VendorTag::Zyxel));
    }

    #[tokio::test]
    async fn custom_oids_take_final_precedence() {
        let custom_fw = parse_oid("1.3.6.1.4.1.99999.1.0").unwrap();
        let custom_host = parse_oid("1.3.6.1.4.1.99999.2.0").unwrap();
        let empty_model = parse_oid("1.3.6.1.4.1.99999.3.0").unwrap();
        let agent = MockAgent::new("192.0.2.1:161")
            .with(oid(mib::MIKROTIK_SOFTWARE_VERSION), SnmpValue::text("7.1"))
            .with(custom_fw.clone(), SnmpValue::text("7.1-custom"))
            .with(custom_host.clone(), SnmpValue::text("rack-a"))
            .with(empty_model.clone(), SnmpValue::text("  "));
        let mut custom = CustomOids::default();
        custom.set(OidField::Firmware, Some(custom_fw));
        custom.set(OidField::Hostname, Some(custom_host));
        custom.set(OidField::Model, Some(empty_model));

        let identity =
            resolve_identity(&agent, Some("RouterOS RB5009"), Some("sys"), Some("RB5009"), &custom).await;
        assert_eq!(identity.firmware.as_deref(), Some("7.1-custom"));
        assert_eq!(identity.hostname.as_deref(), Some("rack-a"));
        assert_eq!(identity.model.as_deref(), Some("RB5009"));
    }

    #[tokio::test]
    async fn uptime_prefers_custom_oid() {
        let custom_uptime = parse_oid("1.3.6.1.4.1.99999.9.0").unwrap();
        let agent = MockAgent::new("192.0.2.1:161")
            .with(oid(mib::SYS_UPTIME), SnmpValue::TimeTicks(4200))
            .with(custom_uptime.clone(), SnmpValue::text("12 days"));
        assert_eq!(read_uptime(&agent, &CustomOids::default()).await, Some(Uptime::Ticks(4200)));

        let mut custom = CustomOids::default();
        custom.set(OidField::Uptime, Some(custom_uptime.clone()));
        assert_eq!(read_uptime(&agent, &custom).await, Some(Uptime::Text("12 days".into())));

        agent.remove(&custom_uptime);
        assert_eq!(read_uptime(&agent, &custom).await, Some(Uptime::Ticks(4200)));
    }

    #[tokio::test]
    async fn model_hint_skips_blank_entries() {
        let column = oid(mib::ENT_PHYSICAL_MODEL_NAME);
        let agent = MockAgent::new("192.0.2.1:161")
            .with(column.child(1), SnmpValue::text(""))
            .with(column.child(67_109_120), SnmpValue::text("CBS350-24P-4G"));
        assert_eq!(entity_model_hint(&agent).await.as_deref(), Some("CBS350-24P-4G"));
    }
}
