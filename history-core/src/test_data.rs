pub const BASIC: &str = include_str!("test_data/basic.txt");
pub const SHOWDOWN: &str = include_str!("test_data/showdown.txt");
pub const ANTE: &str = include_str!("test_data/ante.txt");
pub const ALL_IN: &str = include_str!("test_data/all_in.txt");
pub const RUN_TWICE: &str = include_str!("test_data/run_twice.txt");
pub const STRADDLE: &str = include_str!("test_data/straddle.txt");

pub const HANDS: [&str; 6] = [BASIC, SHOWDOWN, ANTE, ALL_IN, RUN_TWICE, STRADDLE];
