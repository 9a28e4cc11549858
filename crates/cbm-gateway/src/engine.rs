//! The translation engine and lifecycle controller.
//!
//! [`Gateway`] owns the slot tables and is the only writer of slot state.
//! One [`Gateway::tick`] per driver-loop iteration:
//!
//! 1. drain every pending inbound frame and fold ON/OFF events into the
//!    input slots,
//! 2. scan output slots, announcing on change or refresh timeout,
//! 3. scan input slots, requesting a refresh on timeout.
//!
//! The change-or-timeout outputs and timeout-only input requests together
//! give eventual consistency on a best-effort broadcast bus without
//! acknowledgements or sequence numbers.
//!
//! All slot mutation for a tick happens under a single lock acquisition;
//! frames are sent after the lock is released so it is never held across
//! an await. `acquire`/`publish` take the same lock briefly, which keeps
//! a concurrent Modbus session from observing a half-applied tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cbm_canbus::{BusTransport, RawFrame};
use cbm_protocol::{CanId, EventFrame};

use crate::config::{GatewayConfig, Timing};
use crate::error::{GatewayError, GatewayResult, MapDirection};
use crate::slots::SlotBank;

/// The event ↔ I/O translation gateway.
pub struct Gateway {
    slots: Mutex<SlotBank>,
    transport: Mutex<Option<Arc<dyn BusTransport>>>,
    ready: AtomicBool,
    can_id: CanId,
    timing: Timing,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("ready", &self.ready)
            .field("can_id", &self.can_id)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Build a gateway from loaded slot tables. Most callers want
    /// [`Gateway::from_config`]; tests construct the bank directly.
    pub fn new(bank: SlotBank, can_id: CanId, timing: Timing) -> Self {
        Self {
            slots: Mutex::new(bank),
            transport: Mutex::new(None),
            ready: AtomicBool::new(false),
            can_id,
            timing,
        }
    }

    /// Load both mapping files and build the gateway. Either missing file
    /// aborts with a direction-specific error before any transport exists.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        let mut bank = SlotBank::new(config.input_count, config.output_count);

        let text = read_map(&config.input_map, MapDirection::Input)?;
        let bound = bank.load_input_map(&text);
        tracing::info!(path = %config.input_map, bound, "input mapping loaded");

        let text = read_map(&config.output_map, MapDirection::Output)?;
        let bound = bank.load_output_map(&text);
        tracing::info!(path = %config.output_map, bound, "output mapping loaded");

        let can_id = CanId::new(config.can_base_id, config.major_priority, config.minor_priority)?;
        Ok(Self::new(bank, can_id, config.timing.clone()))
    }

    /// Attach an opened transport and enter the Ready state.
    ///
    /// Preloads each bound slot's refresh counter to `index * stagger`
    /// so first timeouts spread out instead of bursting, then sends one
    /// status request per bound input (paced) so the input image converges
    /// without waiting a full timeout window. Outputs are deliberately not
    /// announced here: their desired state belongs to the Modbus side and
    /// must not be overwritten by a synthetic value before the first poll.
    pub async fn start(&self, transport: Arc<dyn BusTransport>) {
        let requests: Vec<EventFrame> = {
            let mut bank = self.slots.lock().unwrap();
            for (index, slot) in bank.outputs.iter_mut().enumerate() {
                if slot.is_bound() {
                    slot.refresh = index as u32 * self.timing.stagger_ticks;
                }
            }
            bank.inputs
                .iter_mut()
                .enumerate()
                .filter(|(_, slot)| slot.is_bound())
                .map(|(index, slot)| {
                    slot.refresh = index as u32 * self.timing.stagger_ticks;
                    EventFrame::status_request(slot.device, slot.event)
                })
                .collect()
        };

        let count = requests.len();
        for request in requests {
            self.send(&transport, request).await;
            tokio::time::sleep(Duration::from_millis(self.timing.startup_pacing_ms)).await;
        }

        *self.transport.lock().unwrap() = Some(transport);
        self.ready.store(true, Ordering::Release);
        tracing::info!(initial_requests = count, "gateway ready");
    }

    /// Leave the Ready state and close the transport. Slot tables are
    /// retained; subsequent ticks are no-ops until the next start.
    pub fn stop(&self) {
        self.ready.store(false, Ordering::Release);
        if let Some(transport) = self.transport.lock().unwrap().take() {
            transport.close();
        }
        tracing::info!("gateway stopped");
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Run one engine cycle. No-op unless Ready.
    pub async fn tick(&self) {
        if !self.is_ready() {
            return;
        }
        let transport = match self.transport.lock().unwrap().as_ref() {
            Some(t) => Arc::clone(t),
            None => return,
        };

        // Drain-to-empty before taking the slot lock.
        let mut inbound = Vec::new();
        loop {
            match transport.try_recv().await {
                Ok(Some(frame)) => inbound.push(frame),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "CAN receive failed");
                    break;
                }
            }
        }

        let outbound = {
            let mut bank = self.slots.lock().unwrap();
            for frame in &inbound {
                apply_inbound(&mut bank, frame);
            }
            let mut outbound = scan_outputs(&mut bank, self.timing.refresh_timeout_ticks);
            outbound.extend(scan_inputs(&mut bank, self.timing.refresh_timeout_ticks));
            outbound
        };

        for frame in outbound {
            self.send(&transport, frame).await;
        }
    }

    /// Copy every input slot's state into a flat boolean buffer, one entry
    /// per logical input index.
    pub fn acquire(&self) -> Vec<bool> {
        let bank = self.slots.lock().unwrap();
        bank.inputs.iter().map(|slot| slot.state).collect()
    }

    /// Copy an externally written flat buffer into the output slots'
    /// desired state, to be processed on the next tick.
    pub fn publish(&self, outputs: &[bool]) {
        let mut bank = self.slots.lock().unwrap();
        for (slot, value) in bank.outputs.iter_mut().zip(outputs) {
            slot.desired = *value;
        }
    }

    async fn send(&self, transport: &Arc<dyn BusTransport>, frame: EventFrame) {
        let raw = RawFrame::new(self.can_id.raw(), frame.encode().to_vec());
        if let Err(e) = transport.send_frame(&raw).await {
            // Dropped for this cycle; the level-triggered scans re-emit.
            tracing::warn!(error = %e, device = frame.device, event = frame.event, "CAN send failed, frame dropped");
        }
    }
}

/// Fold one inbound frame into the input slots. Every bound slot matching
/// the (device, event) pair is updated; unhandled opcodes, short frames
/// and status requests are ignored.
fn apply_inbound(bank: &mut SlotBank, raw: &RawFrame) {
    let frame = match EventFrame::decode(&raw.data) {
        Ok(frame) => frame,
        Err(_) => return, // not an accessory event, out of scope
    };
    let state = if frame.opcode.is_on_event() {
        true
    } else if frame.opcode.is_off_event() {
        false
    } else {
        return; // AREQ from another node
    };

    tracing::debug!(
        opcode = ?frame.opcode,
        device = frame.device,
        event = frame.event,
        "accessory event received"
    );
    for slot in bank
        .inputs
        .iter_mut()
        .filter(|slot| slot.matches(frame.device, frame.event))
    {
        slot.state = state;
        slot.refresh = 0;
    }
}

/// Scan output slots once: announce on change or refresh timeout.
fn scan_outputs(bank: &mut SlotBank, timeout: u32) -> Vec<EventFrame> {
    let mut frames = Vec::new();
    for slot in bank.outputs.iter_mut().filter(|slot| slot.is_bound()) {
        slot.refresh += 1;
        // Stable copy: the Modbus side may publish concurrently between
        // the comparison and the send bookkeeping.
        let desired = slot.desired;
        if desired != slot.last_sent || slot.refresh >= timeout {
            frames.push(EventFrame::accessory(slot.device, slot.event, desired));
            slot.last_sent = desired;
            slot.refresh = 0;
        }
    }
    frames
}

/// Scan input slots once: request a refresh for any slot that has not
/// heard an event for a full timeout window. Recovers events missed while
/// the gateway or the producer was away.
fn scan_inputs(bank: &mut SlotBank, timeout: u32) -> Vec<EventFrame> {
    let mut frames = Vec::new();
    for slot in bank.inputs.iter_mut().filter(|slot| slot.is_bound()) {
        slot.refresh += 1;
        if slot.refresh >= timeout {
            frames.push(EventFrame::status_request(slot.device, slot.event));
            slot.refresh = 0;
        }
    }
    frames
}

fn read_map(path: &str, direction: MapDirection) -> GatewayResult<String> {
    std::fs::read_to_string(path).map_err(|source| GatewayError::MappingFileMissing {
        direction,
        path: path.to_string(),
        source,
    })
}
