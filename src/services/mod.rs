pub mod dispatcher;
pub mod group;
pub mod handlers;
pub mod private;
pub mod reporter;

use crate::interfaces::store::score_arg;

/// `[score, member, field, value, ...]` for the send procedures.
pub(crate) fn send_args(millis: i64, member: &str, fields: Vec<(String, String)>) -> Vec<String> {
    let mut args = Vec::with_capacity(2 + fields.len() * 2);
    args.push(score_arg(millis));
    args.push(member.to_string());
    for (field, value) in fields {
        args.push(field);
        args.push(value);
    }
    args
}
