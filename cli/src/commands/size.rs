use colored::*;

use crate::terminal::{colors, print};
use sweepr_common::config::Config;
use sweepr_common::network::range::IpRange;
use sweepr_common::warn;

pub fn size(range: IpRange, cfg: &Config) {
    if range.is_reversed() {
        warn!("Range {range} is reversed, counting it from {} up", range.lower());
    }

    if cfg.quiet > 1 {
        print::print(&range.size().to_string());
        return;
    }

    print::set_key_width(["Range", "First", "Last", "Targets"]);
    print::aligned_line("Range", range.to_string().color(colors::IPV4_ADDR));
    print::aligned_line("First", range.lower().to_string());
    print::aligned_line("Last", range.upper().to_string());
    print::aligned_line("Targets", range.size().to_string().bold().green());
}
