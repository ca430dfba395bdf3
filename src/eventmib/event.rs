//! Event actions (`mteEventTable` + its notification/set augments) and the
//! four hardcoded internal events every agent carries regardless of
//! configuration, grounded in
//! `Firmware/Plugin/disman/event/mteEvent.c`'s `_init_default_mteEvent`/
//! `_init_link_mteEvent` and `mteEvent_fire`/`_mteEvent_fire_notify`.

use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

use super::trigger::RowStatus;

/// Whether the varbind list for a fired notification puts the trigger's own
/// objects before the event's own objects, or vice versa. §4.4's Design
/// Notes resolve the ambiguous case (`mteEventNotificationObjectsOwner` not
/// itself `strict`) to "event objects first"; `Strict` preserves the
/// RFC-documented trigger-then-event order used when the event row
/// explicitly opts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectOrder {
    #[default]
    NonStrict,
    Strict,
}

/// `mteEventNotification` action: fire a trap carrying `trap_oid` followed
/// by the configured trigger and event object lists.
#[derive(Debug, Clone)]
pub struct NotificationAction {
    pub trap_oid: Oid,
    pub order: ObjectOrder,
}

/// `mteEventSet` action: perform a single SET against `target_oid`, with the
/// matched instance suffix optionally appended (`mteEventSetTargetWild`).
#[derive(Debug, Clone)]
pub struct SetAction {
    pub target_oid: Oid,
    pub value: Value,
    pub append_instance_suffix: bool,
}

/// A configured event row.
#[derive(Debug, Clone, Default)]
pub struct Event {
    pub owner: String,
    pub name: String,
    pub row_status: RowStatus,
    pub enabled: bool,
    pub notification: Option<NotificationAction>,
    pub set: Option<SetAction>,
    /// Survives a restart when `true`.
    pub fixed: bool,
}

const SYS_UP_TIME: [u32; 9] = [1, 3, 6, 1, 2, 1, 1, 3, 0];
const SNMP_TRAP_OID: [u32; 11] = [1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0];

impl Event {
    /// Build the varbind list for this event's notification action, given
    /// the trigger's own object list and the event's object list, each
    /// already expanded against the matched instance suffix, plus the
    /// current `sysUpTime.0` reading.
    pub fn build_notification_varbinds(
        &self,
        sys_up_time: u32,
        trigger_objects: &[VarBind],
        event_objects: &[VarBind],
    ) -> Option<Vec<VarBind>> {
        let action = self.notification.as_ref()?;
        let mut vbs = Vec::with_capacity(2 + trigger_objects.len() + event_objects.len());
        vbs.push(VarBind::new(
            Oid::from_slice(&SYS_UP_TIME),
            Value::TimeTicks(sys_up_time),
        ));
        vbs.push(VarBind::new(
            Oid::from_slice(&SNMP_TRAP_OID),
            Value::ObjectIdentifier(action.trap_oid.clone()),
        ));
        match action.order {
            ObjectOrder::NonStrict => {
                vbs.extend_from_slice(event_objects);
                vbs.extend_from_slice(trigger_objects);
            }
            ObjectOrder::Strict => {
                vbs.extend_from_slice(trigger_objects);
                vbs.extend_from_slice(event_objects);
            }
        }
        Some(vbs)
    }

    /// Build the single varbind for this event's set action, with the
    /// matched instance suffix appended to `target_oid` when configured to.
    pub fn build_set_varbind(&self, instance_suffix: &[u32]) -> Option<VarBind> {
        let action = self.set.as_ref()?;
        let oid = if action.append_instance_suffix {
            action.target_oid.extended(instance_suffix)
        } else {
            action.target_oid.clone()
        };
        Some(VarBind::new(oid, action.value.clone()))
    }
}

/// The names of the four internal trigger-lifecycle events every agent
/// registers regardless of configuration (`_init_default_mteEvent`).
pub const TRIGGER_FIRED: &str = "_mteTriggerFired";
pub const TRIGGER_RISING: &str = "_mteTriggerRising";
pub const TRIGGER_FALLING: &str = "_mteTriggerFalling";
pub const TRIGGER_FAILURE: &str = "_mteTriggerFailure";

/// The link state events (`_init_link_mteEvent`), fired from outside the
/// trigger engine by whatever monitors interface operational status.
pub const LINK_UP: &str = "linkUp";
pub const LINK_DOWN: &str = "linkDown";

const MTE_EVENTS_BASE: [u32; 10] = [1, 3, 6, 1, 4, 1, 8072, 2, 3, 0];
const LINK_TRAPS_BASE: [u32; 9] = [1, 3, 6, 1, 6, 3, 1, 1, 5];

fn internal(owner: &str, name: &str, trap_oid: Oid) -> Event {
    Event {
        owner: owner.to_string(),
        name: name.to_string(),
        row_status: RowStatus::Active,
        enabled: true,
        notification: Some(NotificationAction {
            trap_oid,
            order: ObjectOrder::NonStrict,
        }),
        set: None,
        fixed: true,
    }
}

/// Build the four hardcoded trigger-lifecycle events. These are always
/// present; `eventmib::Engine` seeds its event table with them at
/// construction and they cannot be deleted or reconfigured.
pub fn builtin_trigger_events() -> Vec<Event> {
    [
        (TRIGGER_FIRED, 1),
        (TRIGGER_RISING, 2),
        (TRIGGER_FALLING, 3),
        (TRIGGER_FAILURE, 4),
    ]
    .into_iter()
    .map(|(name, suffix)| internal("_mteEvents", name, Oid::from_slice(&MTE_EVENTS_BASE).extended(&[suffix])))
    .collect()
}

/// Build the two hardcoded link-state events.
pub fn builtin_link_events() -> Vec<Event> {
    [(LINK_UP, 3u32), (LINK_DOWN, 4)]
        .into_iter()
        .map(|(name, suffix)| internal("_mteEvents", name, Oid::from_slice(&LINK_TRAPS_BASE).extended(&[suffix])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_trigger_events_present() {
        let events = builtin_trigger_events();
        let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![TRIGGER_FIRED, TRIGGER_RISING, TRIGGER_FALLING, TRIGGER_FAILURE]
        );
        assert!(events.iter().all(|e| e.fixed));
    }

    #[test]
    fn test_notification_non_strict_puts_event_objects_first() {
        let event = Event {
            owner: "test".into(),
            name: "e1".into(),
            row_status: RowStatus::Active,
            enabled: true,
            notification: Some(NotificationAction {
                trap_oid: Oid::from_slice(&[1, 3, 6, 1, 4, 1, 1]),
                order: ObjectOrder::NonStrict,
            }),
            set: None,
            fixed: false,
        };
        let trigger_objects = vec![VarBind::new(
            Oid::from_slice(&[1, 3, 6, 1, 4, 1, 2]),
            Value::Integer(1),
        )];
        let event_objects = vec![VarBind::new(
            Oid::from_slice(&[1, 3, 6, 1, 4, 1, 3]),
            Value::Integer(2),
        )];
        let vbs = event
            .build_notification_varbinds(12345, &trigger_objects, &event_objects)
            .unwrap();
        assert_eq!(vbs.len(), 4);
        assert_eq!(vbs[2].oid, event_objects[0].oid);
        assert_eq!(vbs[3].oid, trigger_objects[0].oid);
    }

    #[test]
    fn test_set_action_appends_instance_suffix() {
        let event = Event {
            owner: "test".into(),
            name: "e2".into(),
            row_status: RowStatus::Active,
            enabled: true,
            notification: None,
            set: Some(SetAction {
                target_oid: Oid::from_slice(&[1, 3, 6, 1, 4, 1, 4]),
                value: Value::Integer(1),
                append_instance_suffix: true,
            }),
            fixed: false,
        };
        let vb = event.build_set_varbind(&[7]).unwrap();
        assert_eq!(vb.oid, Oid::from_slice(&[1, 3, 6, 1, 4, 1, 4, 7]));
    }
}
