use atat::atat_derive::AtatResp;

/// Commands which get just responded by OK. The logger only classifies responses, so this is used for all
/// commands.
#[derive(Clone, AtatResp)]
pub struct NoResponse;
