//! The boundary I/O image shared with the Modbus responder.
//!
//! Two flat boolean buffers, sized once at startup. The Modbus service
//! reads discrete inputs and reads/writes coils here; the driver loop
//! exchanges the buffers with the gateway's slot tables every tick.
//! Neither side ever touches slot internals directly.

use std::sync::Mutex;

/// Flat boolean input/output buffers, one entry per logical I/O index.
#[derive(Debug)]
pub struct IoImage {
    inputs: Mutex<Vec<bool>>,
    outputs: Mutex<Vec<bool>>,
}

impl IoImage {
    pub fn new(input_count: usize, output_count: usize) -> Self {
        Self {
            inputs: Mutex::new(vec![false; input_count]),
            outputs: Mutex::new(vec![false; output_count]),
        }
    }

    pub fn input_len(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }

    pub fn output_len(&self) -> usize {
        self.outputs.lock().unwrap().len()
    }

    /// Driver side: overwrite the input buffer with freshly acquired
    /// slot states.
    pub fn set_inputs(&self, states: &[bool]) {
        let mut inputs = self.inputs.lock().unwrap();
        let len = inputs.len().min(states.len());
        inputs[..len].copy_from_slice(&states[..len]);
    }

    /// Driver side: snapshot the output buffer for publishing into the
    /// slot tables.
    pub fn outputs_snapshot(&self) -> Vec<bool> {
        self.outputs.lock().unwrap().clone()
    }

    /// Modbus side: read `cnt` discrete inputs starting at `addr`.
    /// `None` when the range falls outside the buffer.
    pub fn read_discrete_inputs(&self, addr: u16, cnt: u16) -> Option<Vec<bool>> {
        read_range(&self.inputs.lock().unwrap(), addr, cnt)
    }

    /// Modbus side: read `cnt` coils starting at `addr`.
    pub fn read_coils(&self, addr: u16, cnt: u16) -> Option<Vec<bool>> {
        read_range(&self.outputs.lock().unwrap(), addr, cnt)
    }

    /// Modbus side: write one coil. False when `addr` is out of range.
    pub fn write_coil(&self, addr: u16, value: bool) -> bool {
        let mut outputs = self.outputs.lock().unwrap();
        match outputs.get_mut(addr as usize) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Modbus side: write a run of coils. False when the range does not
    /// fit; nothing is written in that case.
    pub fn write_coils(&self, addr: u16, values: &[bool]) -> bool {
        let mut outputs = self.outputs.lock().unwrap();
        let start = addr as usize;
        let end = match start.checked_add(values.len()) {
            Some(end) if end <= outputs.len() => end,
            _ => return false,
        };
        outputs[start..end].copy_from_slice(values);
        true
    }
}

fn read_range(buffer: &[bool], addr: u16, cnt: u16) -> Option<Vec<bool>> {
    let start = addr as usize;
    let end = start.checked_add(cnt as usize)?;
    buffer.get(start..end).map(<[bool]>::to_vec)
}
