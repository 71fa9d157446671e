use ash::vk;

use crate::negotiate::*;

fn negotiator() -> InterfaceNegotiator {
    InterfaceNegotiator::new(2, 6)
}

#[test]
fn test_negotiation_table() {
    let cases = [
        (1, InterfaceVersionCheck::LoaderVersionTooOld, vk::Result::ERROR_INCOMPATIBLE_DRIVER, 2),
        (4, InterfaceVersionCheck::DriverVersionTooNew, vk::Result::SUCCESS, 4),
        (9, InterfaceVersionCheck::LoaderVersionTooNew, vk::Result::SUCCESS, 6),
        (6, InterfaceVersionCheck::VersionIsSupported, vk::Result::SUCCESS, 6),
    ];
    for (requested, state, result, written_back) in cases {
        let mut n = negotiator();
        let mut version = requested;
        assert_eq!(n.negotiate(&mut version), result, "requested {}", requested);
        assert_eq!(n.check, state, "requested {}", requested);
        assert_eq!(version, written_back, "requested {}", requested);
    }
}

#[test]
fn test_negotiated_version_is_recorded_on_success_only() {
    let mut n = negotiator();
    let mut v = 9;
    n.negotiate(&mut v);
    assert_eq!(n.negotiated, Some(6));
    assert_eq!(n.effective_version(), 6);

    let mut v = 1;
    n.negotiate(&mut v);
    assert_eq!(n.negotiated, None);
    assert_eq!(n.effective_version(), 2);
}

#[test]
fn test_default_state_is_not_called() {
    let n = InterfaceNegotiator::default();
    assert_eq!(n.check, InterfaceVersionCheck::NotCalled);
    assert_eq!(n.called_negotiate, CalledNegotiateInterface::NotCalled);
    assert_eq!(n.called_gipa, CalledIcdGipa::NotCalled);
    assert_eq!((n.min_supported, n.max_supported), (0, 6));
}

#[test]
fn test_negotiate_before_gipa() {
    let mut n = negotiator();
    let mut v = 6;
    n.negotiate(&mut v);
    n.record_gipa(CalledIcdGipa::VkIcdGipa);
    assert_eq!(n.called_negotiate, CalledNegotiateInterface::VkIcdNegotiate);
    assert_eq!(n.called_gipa, CalledIcdGipa::VkIcdGipa);
}

#[test]
fn test_gipa_before_negotiate() {
    let mut n = negotiator();
    n.record_gipa(CalledIcdGipa::VkIcdGipa);
    let mut v = 6;
    n.negotiate(&mut v);
    assert_eq!(n.called_negotiate, CalledNegotiateInterface::VkIcdGipaFirst);
}

#[test]
fn test_gipa_flag_is_set_once() {
    let mut n = negotiator();
    n.record_gipa(CalledIcdGipa::VkGipa);
    n.record_gipa(CalledIcdGipa::VkIcdGipa);
    assert_eq!(n.called_gipa, CalledIcdGipa::VkGipa);
}
