use alloy::{
    contract::{CallBuilder, CallDecoder},
    primitives::TxHash,
    providers::Provider
};

#[derive(Debug, thiserror::Error)]
pub enum TxError {
    #[error("transaction {0} reverted")]
    Reverted(TxHash)
}

/// Sends a call and waits for its receipt, failing when it reverted.
///
/// Most of the deployment flow fires transactions and verifies their effect
/// by polling state instead; this is for the few administrative calls whose
/// outcome is only observable through the receipt.
pub trait ConfirmedTransaction {
    #[allow(async_fn_in_trait)] // OK because every caller lives in this workspace
    async fn send_confirmed(self) -> eyre::Result<TxHash>;
}

impl<P, D> ConfirmedTransaction for CallBuilder<P, D>
where
    P: Provider,
    D: CallDecoder
{
    async fn send_confirmed(self) -> eyre::Result<TxHash> {
        let receipt = self.send().await?.get_receipt().await?;
        if receipt.inner.status() {
            Ok(receipt.transaction_hash)
        } else {
            Err(TxError::Reverted(receipt.transaction_hash).into())
        }
    }
}
