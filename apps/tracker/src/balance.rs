use crate::rpc::SolanaRpc;
use log::error;

/// Current balance of `owner` for `mint`, summed over all its token accounts.
/// Errors are logged and read as zero. Not used on the alert path.
#[allow(dead_code)]
pub async fn get_token_balance(rpc: &dyn SolanaRpc, owner: &str, mint: &str) -> f64 {
    match rpc.get_token_accounts_by_owner(owner, mint).await {
        Ok(accounts) => schema::sum_token_balance(&accounts),
        Err(e) => {
            error!("error fetching token balance for {owner}: {e}");
            0.0
        }
    }
}
