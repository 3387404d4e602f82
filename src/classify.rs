//! Classification of leftover positional tokens.

/// Splits the tokens left over after flag parsing into command names and
/// environment-variable assignments.
///
/// A token containing `=` is an assignment and is kept verbatim; every
/// other token is a command name. Both lists preserve the input order and
/// no token is dropped.
pub fn classify(leftover: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut commands = Vec::new();
    let mut env_overrides = Vec::new();
    for token in leftover {
        if token.contains('=') {
            env_overrides.push(token);
        } else {
            commands.push(token);
        }
    }
    (commands, env_overrides)
}
