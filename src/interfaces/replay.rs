//! Runs parsed commands against the executor, one at a time, in input order.

use crate::application::executor::AttestationExecutor;
use crate::domain::payment::PaymentRecord;
use crate::error::Result;
use crate::interfaces::csv::command_reader::Command;

pub async fn apply_command(
    executor: &AttestationExecutor,
    command: Command,
) -> Result<PaymentRecord> {
    match command {
        Command::Create(request) => executor.register(request).await,
        Command::AttestSent {
            payment,
            actor,
            details,
        } => executor.attest_sent(&payment, &actor, details).await,
        Command::Confirm {
            payment,
            actor,
            amount_cents,
        } => executor.confirm_receipt(&payment, &actor, amount_cents).await,
        Command::Dispute {
            payment,
            actor,
            reason,
        } => executor.file_dispute(&payment, &actor, reason).await,
    }
}
