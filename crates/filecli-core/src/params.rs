//! 选项参数合并
//!
//! 每个逻辑选项都有短、长两种写法（如 `-b` / `--bind`）。命令行解析时同一选项
//! 的所有出现值被收集到一起，再由这里统一合并：
//!
//! - 与默认值相同的值视为"未设置"
//! - 多个已设置的值互不相同 → 冲突错误
//! - 已设置的值全部相同 → 返回该值
//! - 没有任何已设置的值 → 返回默认值

use std::fmt;
use thiserror::Error;

/// 选项的短/长写法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionName {
    pub short: char,
    pub long: &'static str,
}

impl OptionName {
    pub const fn new(short: char, long: &'static str) -> Self {
        Self { short, long }
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-{}/--{}", self.short, self.long)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("Conflicting values for -{short} and --{long}: {first} vs {second}")]
    Conflict {
        short: char,
        long: &'static str,
        first: String,
        second: String,
    },

    #[error("Please specify the {what} (-{short} or --{long})")]
    Missing {
        what: &'static str,
        short: char,
        long: &'static str,
    },
}

/// 合并同一选项的所有出现值
pub fn resolve<T>(option: OptionName, values: &[T], default: T) -> Result<T, ParamError>
where
    T: PartialEq + Clone + fmt::Debug,
{
    let mut chosen: Option<&T> = None;

    for value in values.iter().filter(|v| **v != default) {
        match chosen {
            None => chosen = Some(value),
            Some(prev) if prev == value => {}
            Some(prev) => {
                return Err(ParamError::Conflict {
                    short: option.short,
                    long: option.long,
                    first: format!("{prev:?}"),
                    second: format!("{value:?}"),
                });
            }
        }
    }

    Ok(chosen.cloned().unwrap_or(default))
}

/// 合并必填选项，以类型默认值作为"未设置"
pub fn resolve_required<T>(
    option: OptionName,
    what: &'static str,
    values: &[T],
) -> Result<T, ParamError>
where
    T: PartialEq + Clone + Default + fmt::Debug,
{
    let value = resolve(option, values, T::default())?;
    if value == T::default() {
        return Err(ParamError::Missing {
            what,
            short: option.short,
            long: option.long,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIND: OptionName = OptionName::new('b', "bind");
    const PORT: OptionName = OptionName::new('p', "port");

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_conflicting_values_rejected() {
        let err = resolve(BIND, &strings(&["1.2.3.4", "5.6.7.8"]), String::new()).unwrap_err();
        assert_eq!(
            err,
            ParamError::Conflict {
                short: 'b',
                long: "bind",
                first: "\"1.2.3.4\"".to_string(),
                second: "\"5.6.7.8\"".to_string(),
            }
        );

        let msg = err.to_string();
        assert!(msg.contains("-b"), "{msg}");
        assert!(msg.contains("--bind"), "{msg}");
        assert!(msg.contains("1.2.3.4") && msg.contains("5.6.7.8"), "{msg}");
    }

    #[test]
    fn test_equal_values_accepted() {
        let value = resolve(BIND, &strings(&["1.2.3.4", "1.2.3.4"]), String::new()).unwrap();
        assert_eq!(value, "1.2.3.4");
    }

    #[test]
    fn test_single_value_wins() {
        assert_eq!(
            resolve(BIND, &strings(&["10.0.0.1"]), String::new()).unwrap(),
            "10.0.0.1"
        );
        assert_eq!(resolve(PORT, &[9000_u16], 0).unwrap(), 9000);
    }

    #[test]
    fn test_default_when_unset() {
        assert_eq!(resolve(BIND, &[], ".".to_string()).unwrap(), ".");
        assert_eq!(resolve(PORT, &[], 8000_u16).unwrap(), 8000);
    }

    /// 显式给出默认值等同于未设置，不会与另一种写法冲突
    #[test]
    fn test_explicit_default_counts_as_unset() {
        let dir = resolve(
            OptionName::new('d', "directory"),
            &strings(&[".", "/srv/files"]),
            ".".to_string(),
        )
        .unwrap();
        assert_eq!(dir, "/srv/files");
    }

    #[test]
    fn test_required_missing() {
        let err = resolve_required::<String>(
            OptionName::new('s', "server"),
            "server address",
            &[],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please specify the server address (-s or --server)"
        );

        let err = resolve_required::<u16>(PORT, "server port", &[0]).unwrap_err();
        assert!(matches!(err, ParamError::Missing { short: 'p', .. }));
    }

    #[test]
    fn test_required_conflict_reported_first() {
        let err = resolve_required(PORT, "server port", &[8000_u16, 8080]).unwrap_err();
        assert!(matches!(err, ParamError::Conflict { .. }));
    }

    #[test]
    fn test_option_name_display() {
        assert_eq!(BIND.to_string(), "-b/--bind");
    }
}
