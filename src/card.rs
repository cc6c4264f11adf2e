//! SIM card status and dual-SIM subscription selection.

use heapless::Vec;
use serde::Serialize;

use crate::host::MAX_INSTANCES;

/// Maximum applications on a card.
pub const MAX_APPS: usize = 8;

/// SIM readiness as classified from `+CPIN?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimStatus {
    Absent,
    NotReady,
    Ready,
    Pin,
    Puk,
    NetworkPersonalization,
}

impl SimStatus {
    /// Maps the `+CPIN:` code. Lock types other than PIN, PUK and network
    /// personalization are reported as an absent SIM.
    pub fn from_code(code: &str) -> Self {
        match code {
            "READY" => Self::Ready,
            "SIM PIN" => Self::Pin,
            "SIM PUK" => Self::Puk,
            "PH-NET PIN" => Self::NetworkPersonalization,
            _ => Self::Absent,
        }
    }

    /// The SIM needs user action or is missing.
    pub fn is_locked_or_absent(self) -> bool {
        matches!(
            self,
            Self::Absent | Self::Pin | Self::Puk | Self::NetworkPersonalization
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CardState {
    Absent,
    Present,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppType {
    Unknown,
    Sim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppState {
    Unknown,
    Detected,
    Pin,
    Puk,
    SubscriptionPerso,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersoSubstate {
    Unknown,
    Ready,
    SimNetwork,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    Unknown,
    EnabledNotVerified,
    EnabledBlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppStatus {
    pub app_type: AppType,
    pub app_state: AppState,
    pub perso_substate: PersoSubstate,
    pub pin1: PinState,
    pub pin2: PinState,
}

impl AppStatus {
    pub fn from_sim_status(status: SimStatus) -> Self {
        let (app_type, app_state, perso_substate, pin1) = match status {
            SimStatus::Absent => (
                AppType::Unknown,
                AppState::Unknown,
                PersoSubstate::Unknown,
                PinState::Unknown,
            ),
            SimStatus::NotReady => (
                AppType::Sim,
                AppState::Detected,
                PersoSubstate::Unknown,
                PinState::Unknown,
            ),
            SimStatus::Ready => (
                AppType::Sim,
                AppState::Ready,
                PersoSubstate::Ready,
                PinState::Unknown,
            ),
            SimStatus::Pin => (
                AppType::Sim,
                AppState::Pin,
                PersoSubstate::Unknown,
                PinState::EnabledNotVerified,
            ),
            SimStatus::Puk => (
                AppType::Sim,
                AppState::Puk,
                PersoSubstate::Unknown,
                PinState::EnabledBlocked,
            ),
            SimStatus::NetworkPersonalization => (
                AppType::Sim,
                AppState::SubscriptionPerso,
                PersoSubstate::SimNetwork,
                PinState::EnabledNotVerified,
            ),
        };

        Self {
            app_type,
            app_state,
            perso_substate,
            pin1,
            pin2: PinState::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CardStatus {
    pub card_state: CardState,
    pub universal_pin_state: PinState,
    pub gsm_umts_subscription_app_index: Option<u8>,
    pub applications: Vec<AppStatus, MAX_APPS>,
}

impl CardStatus {
    /// Projects a SIM status onto the single application a present card
    /// carries. An application that has not been activated through a
    /// subscription selection is reported as not ready.
    pub fn new(status: SimStatus, app_activated: bool) -> Self {
        let mut applications = Vec::new();

        let card_state = if status == SimStatus::Absent {
            CardState::Absent
        } else {
            let status = if app_activated {
                status
            } else {
                SimStatus::NotReady
            };
            // Capacity is MAX_APPS, the push cannot fail
            let _ = applications.push(AppStatus::from_sim_status(status));
            CardState::Present
        };

        Self {
            card_state,
            universal_pin_state: PinState::Unknown,
            gsm_umts_subscription_app_index: (!applications.is_empty()).then_some(0),
            applications,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubscriptionStatus {
    #[default]
    Deactivate,
    Activate,
}

/// Which card application backs a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UiccSubscription {
    pub slot: u8,
    pub app_index: u8,
    pub sub_type: u8,
    pub status: SubscriptionStatus,
}

/// Subscription selections, stored by physical slot.
#[derive(Debug, Clone, Default)]
pub struct Subscriptions {
    selected: [UiccSubscription; MAX_INSTANCES],
}

impl Subscriptions {
    pub const fn new() -> Self {
        const UNSELECTED: UiccSubscription = UiccSubscription {
            slot: 0,
            app_index: 0,
            sub_type: 0,
            status: SubscriptionStatus::Deactivate,
        };
        Self {
            selected: [UNSELECTED; MAX_INSTANCES],
        }
    }

    /// Stores `sub` under its slot. Returns `false` for a slot that does not
    /// exist.
    pub fn select(&mut self, sub: UiccSubscription) -> bool {
        match self.selected.get_mut(usize::from(sub.slot)) {
            Some(entry) => {
                *entry = sub;
                true
            }
            None => false,
        }
    }

    pub fn is_app_ready(&self, slot: u8, app_index: u8) -> bool {
        self.selected.iter().any(|s| {
            s.status == SubscriptionStatus::Activate && s.slot == slot && s.app_index == app_index
        })
    }
}
