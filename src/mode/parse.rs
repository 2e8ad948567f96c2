//! IRC mode parsing.

use crate::isupport::ServerSupport;

use super::types::{ModeChange, ModeClass, ModeFlag, Sign};

/// Classify a mode letter against the built-in defaults and `support`.
pub fn classify(support: &ServerSupport, c: char) -> ModeClass {
    let chanmodes = support.chanmodes();

    if matches!(c, 'o' | 'v') || support.is_status_letter(c) {
        ModeClass::Status
    } else if matches!(c, 'b' | 'e' | 'I') || chanmodes.list.contains(c) {
        ModeClass::List
    } else if c == 'k' || chanmodes.always.contains(c) {
        ModeClass::AlwaysParam
    } else if c == 'l' || chanmodes.on_set.contains(c) {
        ModeClass::ParamOnSet
    } else {
        ModeClass::Boolean
    }
}

/// Parse a mode string like `+ov-k` with its parameters into one change per
/// letter.
///
/// Letters whose class wants a parameter take the next unused one; when the
/// list runs out the change carries `None`. Leftover parameters are ignored.
pub fn parse_mode_changes<S: AsRef<str>>(
    support: &ServerSupport,
    channel: &str,
    modes: &str,
    params: &[S],
) -> Vec<ModeChange> {
    let mut res = Vec::with_capacity(modes.len());
    let mut args = params.iter().map(<S as AsRef<str>>::as_ref);
    let mut sign = Sign::Plus;

    for c in modes.chars() {
        match c {
            '+' => sign = Sign::Plus,
            '-' => sign = Sign::Minus,
            _ => {
                let class = classify(support, c);
                let takes_arg = match class {
                    ModeClass::Status | ModeClass::List | ModeClass::AlwaysParam => true,
                    ModeClass::ParamOnSet => sign.is_plus(),
                    ModeClass::Boolean => false,
                };
                let param = if takes_arg {
                    args.next().map(str::to_owned)
                } else {
                    None
                };

                res.push(ModeChange {
                    channel: channel.to_owned(),
                    flag: ModeFlag::from_char(c),
                    sign,
                    param,
                    class,
                });
            }
        }
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isupport::Isupport;

    fn support(line: &str) -> ServerSupport {
        let params: Vec<&str> = line.split(' ').collect();
        let mut support = ServerSupport::default();
        support.apply(&Isupport::parse_params(&params));
        support
    }

    #[test]
    fn test_builtin_classes() {
        let s = ServerSupport::default();
        assert_eq!(classify(&s, 'o'), ModeClass::Status);
        assert_eq!(classify(&s, 'I'), ModeClass::List);
        assert_eq!(classify(&s, 'k'), ModeClass::AlwaysParam);
        assert_eq!(classify(&s, 'l'), ModeClass::ParamOnSet);
        assert_eq!(classify(&s, 't'), ModeClass::Boolean);
        assert_eq!(classify(&s, 'Z'), ModeClass::Boolean);
    }

    #[test]
    fn test_isupport_classes() {
        let s = support("CHANMODES=beIq,kf,lj,imnpstCS PREFIX=(qaohv)~&@%+");
        assert_eq!(classify(&s, 'h'), ModeClass::Status);
        // PREFIX wins over CHANMODES for the same letter.
        assert_eq!(classify(&s, 'q'), ModeClass::Status);
        assert_eq!(classify(&s, 'f'), ModeClass::AlwaysParam);
        assert_eq!(classify(&s, 'j'), ModeClass::ParamOnSet);
        assert_eq!(classify(&s, 'C'), ModeClass::Boolean);
    }

    #[test]
    fn test_status_modes_take_nicks() {
        let s = support("PREFIX=(ov)@+");
        let changes = parse_mode_changes(&s, "#c", "+ov", &["nick1", "nick2"]);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].flag, ModeFlag::Oper);
        assert_eq!(changes[0].param.as_deref(), Some("nick1"));
        assert_eq!(changes[1].flag, ModeFlag::Voice);
        assert_eq!(changes[1].param.as_deref(), Some("nick2"));
    }

    #[test]
    fn test_limit_only_takes_param_when_set() {
        let s = ServerSupport::default();
        let changes = parse_mode_changes(&s, "#c", "+l-lk", &["10", "*"]);
        assert_eq!(changes[0].param.as_deref(), Some("10"));
        assert_eq!(changes[1].sign, Sign::Minus);
        assert_eq!(changes[1].param, None);
        assert_eq!(changes[2].flag, ModeFlag::Keyed);
        assert_eq!(changes[2].param.as_deref(), Some("*"));
    }

    #[test]
    fn test_missing_param_is_none() {
        let s = ServerSupport::default();
        let changes = parse_mode_changes::<&str>(&s, "#c", "+b", &[]);
        assert_eq!(changes[0].flag, ModeFlag::Ban);
        assert_eq!(changes[0].param, None);
    }

    #[test]
    fn test_booleans_and_signs() {
        let s = ServerSupport::default();
        let changes = parse_mode_changes::<&str>(&s, "#c", "+nt-s", &[]);
        let summary: Vec<_> = changes.iter().map(|c| (c.sign, c.flag)).collect();
        assert_eq!(
            summary,
            [
                (Sign::Plus, ModeFlag::NoExternal),
                (Sign::Plus, ModeFlag::TopicLock),
                (Sign::Minus, ModeFlag::Secret),
            ]
        );
        assert_eq!(changes[2].event_name(), "mode_secret");
    }

    #[test]
    fn test_unknown_letter_named_by_itself() {
        let s = ServerSupport::default();
        let changes = parse_mode_changes::<&str>(&s, "#c", "+R", &[]);
        assert_eq!(changes[0].flag, ModeFlag::Other('R'));
        assert_eq!(changes[0].event_name(), "mode_R");
        assert_eq!(changes[0].to_string(), "#c +R");
    }
}
