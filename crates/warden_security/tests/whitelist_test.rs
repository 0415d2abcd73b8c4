//! Whitelist behavior.

use warden_core::ActorId;
use warden_error::CommandErrorKind;
use warden_security::Whitelist;

#[test]
fn test_owner_always_present() {
    let owner = ActorId::new(1);
    let whitelist = Whitelist::new(owner);

    assert!(whitelist.contains(owner));
    assert!(whitelist.is_owner(owner));
    assert_eq!(whitelist.members(), vec![owner]);
}

#[test]
fn test_owner_cannot_be_removed() {
    let owner = ActorId::new(1);
    let whitelist = Whitelist::new(owner);

    let err = whitelist.remove(owner).unwrap_err();
    assert_eq!(err.kind(), &CommandErrorKind::ProtectedIdentity(1));
    assert!(whitelist.contains(owner));
}

#[test]
fn test_add_and_remove() {
    let whitelist = Whitelist::new(ActorId::new(1));
    let admin = ActorId::new(2);

    assert!(whitelist.add(admin));
    assert!(!whitelist.add(admin));
    assert!(whitelist.contains(admin));

    assert!(whitelist.remove(admin).unwrap());
    assert!(!whitelist.remove(admin).unwrap());
    assert!(!whitelist.contains(admin));
}

#[test]
fn test_system_identity_protected() {
    let whitelist = Whitelist::new(ActorId::new(1));
    let bot = ActorId::new(99);
    whitelist.register_system(bot);

    assert!(whitelist.contains(bot));
    assert!(whitelist.is_protected(bot));
    assert!(!whitelist.is_owner(bot));
    assert!(whitelist.remove(bot).is_err());
    assert_eq!(whitelist.len(), 2);
}
