pub(crate) const DUTCH_NUMBERS: [&str; 31] = [
    "nul", "een", "twee", "drie", "vier", "vijf", "zes", "zeven", "acht", "negen", "tien", "elf",
    "twaalf", "dertien", "veertien", "vijftien", "zestien", "zeventien", "achttien", "negentien",
    "twintig", "eenentwintig", "tweeëntwintig", "drieëntwintig", "vierentwintig",
    "vijfentwintig", "zesentwintig", "zevenentwintig", "achtentwintig", "negenentwintig",
    "dertig",
];

pub(crate) fn dutch_buffer(len: usize) -> Vec<String> {
    DUTCH_NUMBERS[..len].iter().map(|s| s.to_string()).collect()
}

/// File contents where line `i` (1-based) is the decimal text of `i`.
pub(crate) fn numbered_lines(count: u32) -> String {
    let mut out = String::new();
    for i in 1..=count {
        out.push_str(&i.to_string());
        out.push('\n');
    }
    out
}
