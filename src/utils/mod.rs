mod date;
mod timezone;

pub(crate) use date::{day_prefix, format_day, parse_day, parse_timestamp};
pub(crate) use timezone::Timezone;
