//! Colored log fragments, only when logging to a terminal.
use crate::config::get_config;
use colored::Colorize;

pub trait MaybeColorize {
    fn green(&self) -> String;
    fn red(&self) -> String;
    fn purple(&self) -> String;
    fn yellow(&self) -> String;
}

impl MaybeColorize for &str {
    fn green(&self) -> String {
        colorize(self, |text| Colorize::green(text))
    }

    fn red(&self) -> String {
        colorize(self, |text| Colorize::red(text))
    }

    fn purple(&self) -> String {
        colorize(self, |text| Colorize::purple(text))
    }

    fn yellow(&self) -> String {
        colorize(self, |text| Colorize::yellow(text))
    }
}

impl MaybeColorize for String {
    fn green(&self) -> String {
        MaybeColorize::green(&self.as_str())
    }

    fn red(&self) -> String {
        MaybeColorize::red(&self.as_str())
    }

    fn purple(&self) -> String {
        MaybeColorize::purple(&self.as_str())
    }

    fn yellow(&self) -> String {
        MaybeColorize::yellow(&self.as_str())
    }
}

fn colorize(text: &str, color: fn(&str) -> colored::ColoredString) -> String {
    if get_config().tty {
        color(text).to_string()
    } else {
        text.to_string()
    }
}
