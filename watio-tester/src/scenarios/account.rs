//! Sign-in reconciliation against an in-memory account backend.
use anyhow::{Result, bail, ensure};
use async_trait::async_trait;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use watio_access::{
    AccessibilityProfile, ConflictChoice, MemoryRemote, Reconciliation, Session,
};

use super::Scenario;
use crate::device::Device;

const ACCOUNT_ID: &str = "5b0c1f2e-hogar";

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    vec![Box::new(AccountSync)]
}

/// Two distinct profiles drawn from the seed.
fn profile_pair(rng: &mut ChaCha8Rng) -> Result<(AccessibilityProfile, AccessibilityProfile)> {
    let mut profiles = AccessibilityProfile::ALL.to_vec();
    profiles.shuffle(rng);
    match profiles.as_slice() {
        [local, account, ..] => Ok((*local, *account)),
        _ => bail!("need two profiles"),
    }
}

fn signed_in(device: &mut Device) {
    device
        .engine
        .set_session(Some(Session::new(ACCOUNT_ID, "test-token")));
}

pub struct AccountSync;

impl AccountSync {
    async fn conflict(rng: &mut ChaCha8Rng) -> Result<()> {
        let (local, account) = profile_pair(rng)?;
        let remote = MemoryRemote::default();
        remote.set_row(ACCOUNT_ID, Some(account));

        let mut device = Device::fresh(false);
        device.engine.apply_profile(local);
        signed_in(&mut device);

        let outcome = device.engine.reconcile_with_account(&remote).await;
        let Reconciliation::Conflict(conflict) = outcome else {
            bail!("{local} vs {account} reconciled as {outcome:?}");
        };
        ensure!(
            conflict.local == local && conflict.account == account,
            "conflict {conflict:?}"
        );
        ensure!(device.engine.profile() == local, "profile changed before a choice");

        let choice = *[ConflictChoice::KeepLocal, ConflictChoice::UseAccount]
            .choose(rng)
            .unwrap_or(&ConflictChoice::KeepLocal);
        let kept = device
            .engine
            .resolve_conflict(&remote, conflict, choice)
            .await;
        match choice {
            ConflictChoice::KeepLocal => {
                ensure!(kept == Some(local), "keep local returned {kept:?}");
                ensure!(device.engine.profile() == local, "local profile lost");
                ensure!(remote.row(ACCOUNT_ID) == Some(account), "account overwritten");
                ensure!(remote.updates() == 0, "keep local wrote the account");
            }
            ConflictChoice::UseAccount => {
                ensure!(kept == Some(account), "use account returned {kept:?}");
                ensure!(device.engine.profile() == account, "account profile not applied");
            }
        }
        device.check_all()
    }

    async fn adoption(rng: &mut ChaCha8Rng) -> Result<()> {
        let (_, account) = profile_pair(rng)?;
        let remote = MemoryRemote::default();
        remote.set_row(ACCOUNT_ID, Some(account));

        let mut device = Device::fresh(false);
        ensure!(
            device.engine.reconcile_with_account(&remote).await == Reconciliation::NoSession,
            "reconciled without a session"
        );
        signed_in(&mut device);
        let outcome = device.engine.reconcile_with_account(&remote).await;
        ensure!(
            outcome == Reconciliation::Adopted(account),
            "empty device reconciled as {outcome:?}"
        );
        ensure!(device.engine.profile() == account, "adopted profile not applied");

        remote.fail_requests(true);
        let outcome = device.engine.reconcile_with_account(&remote).await;
        ensure!(
            outcome == Reconciliation::Unavailable,
            "offline backend reconciled as {outcome:?}"
        );
        ensure!(device.engine.profile() == account, "offline read changed the profile");
        device.check_all()
    }

    async fn selection(rng: &mut ChaCha8Rng) -> Result<()> {
        let (_, chosen) = profile_pair(rng)?;
        let remote = MemoryRemote::default();
        let mut device = Device::fresh(false);

        device.engine.select_profile(&remote, chosen).await?;
        ensure!(remote.updates() == 0, "wrote the account without a session");

        signed_in(&mut device);
        device.engine.select_profile(&remote, chosen).await?;
        ensure!(remote.row(ACCOUNT_ID) == Some(chosen), "account not updated");

        remote.fail_requests(true);
        let failed = device
            .engine
            .select_profile(&remote, AccessibilityProfile::None)
            .await;
        ensure!(failed.is_err(), "offline write reported success");
        ensure!(
            device.engine.profile() == AccessibilityProfile::None,
            "local change dropped after a failed write"
        );
        device.check_all()
    }
}

#[async_trait(?Send)]
impl Scenario for AccountSync {
    fn key(&self) -> &'static str {
        "account-sync"
    }

    fn description(&self) -> &'static str {
        "Sign-in conflicts, adoption and profile writes against the account"
    }

    async fn run(&self, seed: u64) -> Result<()> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::conflict(&mut rng).await?;
        Self::adoption(&mut rng).await?;
        Self::selection(&mut rng).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            let (a, b) = profile_pair(&mut rng).unwrap();
            assert_ne!(a, b);
        }
    }

    #[tokio::test]
    async fn account_sync_passes() {
        for seed in 0..6 {
            AccountSync.run(seed).await.unwrap();
        }
    }
}
