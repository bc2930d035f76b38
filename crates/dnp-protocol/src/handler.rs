//! Command handler interface called by the protocol stack

use crate::command::{
    AnalogOutputDouble64, AnalogOutputFloat32, AnalogOutputInt16, AnalogOutputInt32,
    CommandStatus, ControlRelayOutputBlock, OperateType,
};
use crate::update::UpdateHandler;

/// Receives select and operate requests for every supported command shape
///
/// `select` reserves a point ahead of a select-before-operate `operate`; it
/// must not change point state. `operate` executes the command and may report
/// resulting measurements through `handler`.
pub trait CommandHandler: Send + Sync {
    /// Called before a batch of commands from one request
    fn begin(&self) {}

    /// Called after the last command of a request
    fn end(&self) {}

    fn select_crob(&self, command: &ControlRelayOutputBlock, index: u16) -> CommandStatus;

    fn operate_crob(
        &self,
        command: &ControlRelayOutputBlock,
        index: u16,
        handler: &mut dyn UpdateHandler,
        op_type: OperateType,
    ) -> CommandStatus;

    fn select_aoi16(&self, command: &AnalogOutputInt16, index: u16) -> CommandStatus;

    fn operate_aoi16(
        &self,
        command: &AnalogOutputInt16,
        index: u16,
        handler: &mut dyn UpdateHandler,
        op_type: OperateType,
    ) -> CommandStatus;

    fn select_aoi32(&self, command: &AnalogOutputInt32, index: u16) -> CommandStatus;

    fn operate_aoi32(
        &self,
        command: &AnalogOutputInt32,
        index: u16,
        handler: &mut dyn UpdateHandler,
        op_type: OperateType,
    ) -> CommandStatus;

    fn select_aof32(&self, command: &AnalogOutputFloat32, index: u16) -> CommandStatus;

    fn operate_aof32(
        &self,
        command: &AnalogOutputFloat32,
        index: u16,
        handler: &mut dyn UpdateHandler,
        op_type: OperateType,
    ) -> CommandStatus;

    fn select_aod64(&self, command: &AnalogOutputDouble64, index: u16) -> CommandStatus;

    fn operate_aod64(
        &self,
        command: &AnalogOutputDouble64,
        index: u16,
        handler: &mut dyn UpdateHandler,
        op_type: OperateType,
    ) -> CommandStatus;
}
