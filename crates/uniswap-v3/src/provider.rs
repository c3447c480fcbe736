use alloy::{
    network::{Ethereum, EthereumWallet},
    providers::{
        Identity, RootProvider, builder,
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller
        }
    },
    signers::local::PrivateKeySigner
};

/// Provider with the recommended fillers and a local signing wallet.
pub type WalletProviderRpc = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>
        >,
        WalletFiller<EthereumWallet>
    >,
    RootProvider,
    Ethereum
>;

/// Connects to `endpoint` (http, ws or ipc) signing with `signer`.
pub async fn connect(endpoint: &str, signer: PrivateKeySigner) -> eyre::Result<WalletProviderRpc> {
    let sender = signer.address();
    let wallet = EthereumWallet::new(signer);
    let rpc = builder::<Ethereum>()
        .with_recommended_fillers()
        .wallet(wallet)
        .connect(endpoint)
        .await?;

    tracing::info!(endpoint, %sender, "connected to node");
    Ok(rpc)
}
