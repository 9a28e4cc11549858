//! Slot tables and the mapping loader.
//!
//! One slot per logical boolean I/O point, fixed capacity, allocated once
//! at startup. A slot is bound by a `(device, event)` pair; device 0 means
//! unbound, and unbound slots are never scanned or matched.
//!
//! Mapping files are plain text, one binding per line:
//! `<index> <device> <event>`, fields separated by spaces or commas.
//! Lines starting with `#` are comments. A malformed or out-of-range line
//! silently leaves its slot unbound; the last line for an index wins.

/// One logical boolean input, fed by inbound accessory events.
#[derive(Debug, Clone, Default)]
pub struct InputSlot {
    pub device: u16,
    pub event: u16,
    /// Last known value from the bus.
    pub state: bool,
    /// Ticks since the last event received for this slot.
    pub refresh: u32,
}

impl InputSlot {
    pub fn is_bound(&self) -> bool {
        self.device != 0
    }

    pub fn matches(&self, device: u16, event: u16) -> bool {
        self.is_bound() && self.device == device && self.event == event
    }
}

/// One logical boolean output, announced to the bus on change or timeout.
#[derive(Debug, Clone, Default)]
pub struct OutputSlot {
    pub device: u16,
    pub event: u16,
    /// Value requested by the Modbus side via publish.
    pub desired: bool,
    /// Last value actually transmitted. Sole basis for change detection.
    pub last_sent: bool,
    /// Ticks since the last transmission.
    pub refresh: u32,
}

impl OutputSlot {
    pub fn is_bound(&self) -> bool {
        self.device != 0
    }
}

/// The two fixed-capacity slot tables. Lives behind a single mutex inside
/// the gateway; a full tick's worth of updates is applied under one lock
/// acquisition so acquire/publish never observe a half-updated table.
#[derive(Debug)]
pub struct SlotBank {
    pub inputs: Vec<InputSlot>,
    pub outputs: Vec<OutputSlot>,
}

impl SlotBank {
    pub fn new(input_count: usize, output_count: usize) -> Self {
        Self {
            inputs: vec![InputSlot::default(); input_count],
            outputs: vec![OutputSlot::default(); output_count],
        }
    }

    /// Apply an input mapping description. Returns the number of bound
    /// slots afterwards.
    pub fn load_input_map(&mut self, text: &str) -> usize {
        for (index, device, event) in parse_bindings(text, self.inputs.len()) {
            tracing::debug!(index, device, event, "input binding");
            self.inputs[index].device = device;
            self.inputs[index].event = event;
        }
        self.inputs.iter().filter(|s| s.is_bound()).count()
    }

    /// Apply an output mapping description. Returns the number of bound
    /// slots afterwards.
    pub fn load_output_map(&mut self, text: &str) -> usize {
        for (index, device, event) in parse_bindings(text, self.outputs.len()) {
            tracing::debug!(index, device, event, "output binding");
            self.outputs[index].device = device;
            self.outputs[index].event = event;
        }
        self.outputs.iter().filter(|s| s.is_bound()).count()
    }
}

/// Parse all valid binding lines from a mapping description, dropping
/// comments, malformed lines, and anything out of range.
fn parse_bindings(text: &str, capacity: usize) -> impl Iterator<Item = (usize, u16, u16)> + '_ {
    text.lines()
        .filter_map(move |line| parse_binding(line).filter(|(index, _, _)| *index < capacity))
}

/// Parse one `<index> <device> <event>` line. Returns `None` for comments,
/// blanks, malformed fields, device outside 1-65534, or event above 65534.
fn parse_binding(line: &str) -> Option<(usize, u16, u16)> {
    if line.starts_with('#') {
        return None;
    }
    let mut fields = line
        .split(|c: char| c == ' ' || c == ',' || c == '\t')
        .filter(|f| !f.is_empty());
    let index: usize = fields.next()?.parse().ok()?;
    let device: u16 = fields.next()?.parse().ok()?;
    let event: u16 = fields.next()?.parse().ok()?;
    if device == 0 || device == u16::MAX || event == u16::MAX {
        return None;
    }
    Some((index, device, event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_space_and_comma_separated_fields() {
        assert_eq!(parse_binding("3 100 200"), Some((3, 100, 200)));
        assert_eq!(parse_binding("3,100,200"), Some((3, 100, 200)));
        assert_eq!(parse_binding("3, 100, 200"), Some((3, 100, 200)));
        assert_eq!(parse_binding("3\t100\t200"), Some((3, 100, 200)));
    }

    #[test]
    fn rejects_comments_blanks_and_garbage() {
        assert_eq!(parse_binding("# 3 100 200"), None);
        assert_eq!(parse_binding(""), None);
        assert_eq!(parse_binding("three 100 200"), None);
        assert_eq!(parse_binding("3 100"), None);
        assert_eq!(parse_binding("3 -1 200"), None);
    }

    #[test]
    fn rejects_out_of_range_device_and_event() {
        // device must be 1-65534
        assert_eq!(parse_binding("0 0 200"), None);
        assert_eq!(parse_binding("0 65535 200"), None);
        // event must be 0-65534
        assert_eq!(parse_binding("0 100 65535"), None);
        assert_eq!(parse_binding("0 100 0"), Some((0, 100, 0)));
        assert_eq!(parse_binding("0 65534 65534"), Some((0, 65534, 65534)));
    }

    #[test]
    fn load_populates_slots_and_skips_bad_lines() {
        let mut bank = SlotBank::new(8, 8);
        let bound = bank.load_input_map(
            "# comment\n\
             3 100 200\n\
             garbage line\n\
             99 100 200\n\
             5,300,400\n",
        );
        assert_eq!(bound, 2);
        assert_eq!(bank.inputs[3].device, 100);
        assert_eq!(bank.inputs[3].event, 200);
        assert_eq!(bank.inputs[5].device, 300);
        assert_eq!(bank.inputs[5].event, 400);
        assert!(!bank.inputs[0].is_bound());
        assert!(!bank.inputs[4].is_bound());
    }

    #[test]
    fn last_write_to_an_index_wins() {
        let mut bank = SlotBank::new(4, 4);
        bank.load_output_map("1 10 20\n1 30 40\n");
        assert_eq!(bank.outputs[1].device, 30);
        assert_eq!(bank.outputs[1].event, 40);
    }

    #[test]
    fn out_of_range_index_ignored() {
        let mut bank = SlotBank::new(2, 2);
        assert_eq!(bank.load_input_map("2 100 200\n7 100 200\n"), 0);
    }

    #[test]
    fn matches_requires_binding() {
        let slot = InputSlot::default();
        // device 0 = unbound, must never match anything
        assert!(!slot.matches(0, 0));

        let slot = InputSlot {
            device: 100,
            event: 200,
            ..Default::default()
        };
        assert!(slot.matches(100, 200));
        assert!(!slot.matches(100, 201));
        assert!(!slot.matches(101, 200));
    }
}
