//! Pin roles of the GU-7000 parallel interface and their bindings.

use super::PinId;
use crate::{Error, Result};
use std::str::FromStr;

/// A signal on the module's parallel connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PinRole {
    /// Busy output of the module (connector pin 3), high while it cannot accept data.
    Busy,
    /// Write strobe (connector pin 5), data is latched on the rising edge.
    Write,
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
}

impl PinRole {
    /// Every role, in configuration order.
    pub const ALL: [PinRole; 10] = [
        PinRole::Busy,
        PinRole::Write,
        PinRole::D0,
        PinRole::D1,
        PinRole::D2,
        PinRole::D3,
        PinRole::D4,
        PinRole::D5,
        PinRole::D6,
        PinRole::D7,
    ];

    /// Data line roles, bit 0 first.
    pub const DATA: [PinRole; 8] = [
        PinRole::D0,
        PinRole::D1,
        PinRole::D2,
        PinRole::D3,
        PinRole::D4,
        PinRole::D5,
        PinRole::D6,
        PinRole::D7,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for PinRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "busy" => Ok(PinRole::Busy),
            "write" => Ok(PinRole::Write),
            "d0" => Ok(PinRole::D0),
            "d1" => Ok(PinRole::D1),
            "d2" => Ok(PinRole::D2),
            "d3" => Ok(PinRole::D3),
            "d4" => Ok(PinRole::D4),
            "d5" => Ok(PinRole::D5),
            "d6" => Ok(PinRole::D6),
            "d7" => Ok(PinRole::D7),
            _ => Err(Error::UnknownPinRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for PinRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinRole::Busy => write!(f, "Busy"),
            PinRole::Write => write!(f, "Write"),
            data => write!(f, "D{}", data.index() - PinRole::D0.index()),
        }
    }
}

/// Binding of all ten roles to physical pins. Fixed for the life of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSet {
    pins: [PinId; 10],
}

impl PinSet {
    /// Builds a pin set from explicit assignments.
    pub fn new(busy: PinId, write: PinId, data: [PinId; 8]) -> Result<Self> {
        let mut pins = [busy; 10];
        pins[PinRole::Write.index()] = write;
        for (role, pin) in PinRole::DATA.iter().zip(data) {
            pins[role.index()] = pin;
        }
        Self::checked(pins)
    }

    /// Builds a pin set from `(role name, pin)` pairs, e.g. a config table.
    ///
    /// Every role must appear and no other names may. A role listed twice
    /// keeps its last binding.
    pub fn from_bindings<I, S>(bindings: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let mut slots: [Option<PinId>; 10] = [None; 10];
        for (name, pin) in bindings {
            let role: PinRole = name.as_ref().parse()?;
            slots[role.index()] = Some(PinId(pin));
        }

        let mut pins = [PinId(0); 10];
        for role in PinRole::ALL {
            pins[role.index()] = slots[role.index()].ok_or(Error::MissingPinBinding(role))?;
        }
        Self::checked(pins)
    }

    fn checked(pins: [PinId; 10]) -> Result<Self> {
        for (i, first) in PinRole::ALL.iter().enumerate() {
            for second in &PinRole::ALL[i + 1..] {
                if pins[first.index()] == pins[second.index()] {
                    return Err(Error::DuplicatePin {
                        pin: pins[first.index()].0,
                        first: *first,
                        second: *second,
                    });
                }
            }
        }
        Ok(Self { pins })
    }

    /// Pin bound to a role.
    pub fn pin(&self, role: PinRole) -> PinId {
        self.pins[role.index()]
    }

    pub fn busy(&self) -> PinId {
        self.pin(PinRole::Busy)
    }

    pub fn write(&self) -> PinId {
        self.pin(PinRole::Write)
    }

    /// Data line for bit `bit` (0-7).
    pub fn data(&self, bit: usize) -> PinId {
        self.pin(PinRole::DATA[bit])
    }

    /// All bindings in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (PinRole, PinId)> + '_ {
        PinRole::ALL.iter().map(move |role| (*role, self.pin(*role)))
    }
}
