//! Decides which discovered printers get programmed, and with what.

use crate::{
    error::{Error, Result},
    host::{UsbHost, UsbPath},
    id::Identifier,
    protocol::{self, Delay, Programmer},
    registry::{DeviceDescriptor, DeviceRegistry},
};
use rand::Rng;

/// Where the USB-ID for each printer comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSource {
    /// The same USB-ID for every selected printer. Validated per printer.
    Explicit(String),
    /// A fresh random USB-ID per printer.
    Random,
}

/// What a run should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub id: IdSource,
    /// Only show the discovered printers.
    pub list_only: bool,
    /// Report what would be programmed without touching the bus.
    pub simulate: bool,
    /// Only program the printer at this path. `None` programs all of them.
    pub target: Option<UsbPath>,
    /// Print a slip asking for a reboot after programming.
    pub reboot_prompt: bool,
}

/// Progress of [`run`], in the order it happens.
#[derive(Debug)]
pub enum Event<'a> {
    NoDevices,
    Found(usize),
    Device {
        index: usize,
        device: &'a DeviceDescriptor,
    },
    RandomId,
    Setting {
        index: usize,
        id: &'a str,
    },
    /// Simulation: `id` would have been written.
    WouldProgram {
        index: usize,
        id: &'a str,
    },
    NotTargeted {
        index: usize,
    },
    /// The reboot slip is about to be printed after `id` is programmed.
    RebootPrompt {
        index: usize,
        id: &'a Identifier,
    },
    Programmed {
        index: usize,
        id: &'a Identifier,
    },
    Failed {
        index: usize,
        error: &'a Error,
    },
}

/// Outcome counts of a [`run`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub programmed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Walks `registry` in order and programs the printers `plan` selects.
///
/// A failing printer is reported through `report` and counted; the remaining
/// printers are still processed. The "already set" guard counts as skipped,
/// not failed.
pub fn run<H, D, R, F>(
    programmer: &mut Programmer<H, D>,
    registry: &DeviceRegistry,
    plan: &Plan,
    rng: &mut R,
    mut report: F,
) -> Summary
where
    H: UsbHost,
    D: Delay,
    R: Rng + ?Sized,
    F: FnMut(Event<'_>),
{
    let mut summary = Summary::default();

    if registry.is_empty() {
        report(Event::NoDevices);
        return summary;
    }
    report(Event::Found(registry.len()));

    for (index, device) in registry.iter().enumerate() {
        report(Event::Device { index, device });
        if plan.list_only {
            continue;
        }

        let candidate = match &plan.id {
            IdSource::Explicit(id) => id.clone(),
            IdSource::Random => {
                report(Event::RandomId);
                Identifier::random(rng).to_string()
            }
        };
        report(Event::Setting {
            index,
            id: &candidate,
        });

        if !device.is_selected_by(plan.target) {
            summary.skipped += 1;
            report(Event::NotTargeted { index });
            continue;
        }

        if plan.simulate {
            summary.skipped += 1;
            report(Event::WouldProgram {
                index,
                id: &candidate,
            });
            continue;
        }

        let result = protocol::check_candidate(device, &candidate).and_then(|id| {
            if plan.reboot_prompt {
                report(Event::RebootPrompt { index, id: &id });
            }
            programmer.send(device.path, &id, plan.reboot_prompt)?;
            Ok(id)
        });

        match result {
            Ok(id) => {
                summary.programmed += 1;
                report(Event::Programmed { index, id: &id });
            }
            Err(error) => {
                if error.is_already_set() {
                    summary.skipped += 1;
                } else {
                    summary.failed += 1;
                }
                report(Event::Failed {
                    index,
                    error: &error,
                });
            }
        }
    }

    summary
}

/// Gives every printer without a USB-ID a random one and prints the reboot
/// slip on it.
///
/// Stops at the first printer that fails; printers after it are left alone.
/// With `simulate` set nothing is written and every such printer is reported
/// as [`Event::WouldProgram`]. Returns the number of printers programmed.
pub fn set_random_for_unset<H, D, R, F>(
    programmer: &mut Programmer<H, D>,
    registry: &DeviceRegistry,
    simulate: bool,
    rng: &mut R,
    mut report: F,
) -> Result<usize>
where
    H: UsbHost,
    D: Delay,
    R: Rng + ?Sized,
    F: FnMut(Event<'_>),
{
    let mut programmed = 0;
    for (index, device) in registry.iter().enumerate() {
        if device.has_serial_number() {
            continue;
        }
        let id = Identifier::random(rng);

        if simulate {
            report(Event::WouldProgram {
                index,
                id: id.as_str(),
            });
            continue;
        }

        report(Event::RebootPrompt { index, id: &id });
        programmer.send(device.path, &id, true)?;
        programmed += 1;
        report(Event::Programmed { index, id: &id });
    }
    Ok(programmed)
}
