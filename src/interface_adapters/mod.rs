// Interface adapters: wire protocol and snapshot fan-out.

pub mod protocol;
pub mod relay;
