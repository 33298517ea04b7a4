mod common;

use rustgiop::{
  fragment_from, split_into_fragments, CodecConfig, FragmentAssembler, GiopError, GiopHeader,
  GiopVersion, Message, MessageFactory, MessageKind, MessageType, ReplyOutcome,
};
use speedy::Endianness;

use common::{init_logging, read_back};

fn big_request(version: GiopVersion, request_id: u32) -> (Message, Vec<u8>) {
  let arguments: Vec<u8> = (0..3000u32).map(|i| (i % 251) as u8).collect();
  let request = MessageFactory::create_request(
    version,
    request_id,
    true,
    b"ImageStore",
    "upload",
    Vec::new(),
    b"",
  )
  .unwrap()
  .with_endianness(Endianness::LittleEndian);
  (request, arguments)
}

#[test]
fn split_then_reassemble() {
  init_logging();
  let factory = MessageFactory::default();
  let fragment_size = factory.config().fragment_size();

  for &version in [GiopVersion::V1_1, GiopVersion::V1_2].iter() {
    let (request, arguments) = big_request(version, 1001);
    let encoded = request.encode(&arguments).unwrap();
    let pieces = split_into_fragments(&request, &encoded, fragment_size).unwrap();
    assert!(pieces.len() > 3);
    assert!(pieces.iter().all(|p| p.len() <= fragment_size));

    let mut assembler = FragmentAssembler::new();
    let mut whole = None;
    for (i, piece) in pieces.iter().enumerate() {
      let (message, _) = read_back(&factory, piece).unwrap();
      assert_eq!(message.more_fragments_to_follow(), i + 1 < pieces.len());
      if i > 0 {
        assert_eq!(message.message_type(), MessageType::FRAGMENT);
        assert!(message.header.is_little_endian());
      }
      assert!(whole.is_none());
      whole = assembler.accept(&message, piece).unwrap();
    }

    let whole = whole.expect("last fragment completes the message");
    assert_eq!(&whole[..], &encoded[..]);
    assert_eq!(assembler.pending(), 0);

    let (message, body) = read_back(&factory, &whole).unwrap();
    assert!(!message.more_fragments_to_follow());
    assert_eq!(body, arguments);
  }
}

#[test]
fn interleaved_requests_on_a_1_2_connection() {
  let factory = MessageFactory::default();
  let (first, first_args) = big_request(GiopVersion::V1_2, 1);
  let (second, second_args) = big_request(GiopVersion::V1_2, 2);
  let first_pieces =
    split_into_fragments(&first, &first.encode(&first_args).unwrap(), 512).unwrap();
  let second_pieces =
    split_into_fragments(&second, &second.encode(&second_args).unwrap(), 512).unwrap();
  assert_eq!(first_pieces.len(), second_pieces.len());

  let mut assembler = FragmentAssembler::new();
  let mut completed = Vec::new();
  for (a, b) in first_pieces.iter().zip(second_pieces.iter()) {
    for piece in [b, a].iter() {
      let (message, _) = read_back(&factory, piece).unwrap();
      if let Some(whole) = assembler.accept(&message, piece).unwrap() {
        completed.push(read_back(&factory, &whole).unwrap());
      }
    }
  }

  assert_eq!(completed.len(), 2);
  assert_eq!(completed[0].0.request_id(), Some(2));
  assert_eq!(completed[0].1, second_args);
  assert_eq!(completed[1].0.request_id(), Some(1));
  assert_eq!(completed[1].1, first_args);
}

#[test]
fn cancelled_request_drops_its_fragments() {
  let factory = MessageFactory::default();
  let (request, arguments) = big_request(GiopVersion::V1_2, 55);
  let pieces =
    split_into_fragments(&request, &request.encode(&arguments).unwrap(), 1024).unwrap();

  let mut assembler = FragmentAssembler::new();
  let (head, _) = read_back(&factory, &pieces[0]).unwrap();
  assert_eq!(assembler.accept(&head, &pieces[0]).unwrap(), None);
  assert!(assembler.cancel(55));
  assert_eq!(assembler.pending(), 0);

  // late fragments are discarded, not an error
  for piece in pieces[1..].iter() {
    let (message, _) = read_back(&factory, piece).unwrap();
    assert_eq!(assembler.accept(&message, piece).unwrap(), None);
  }
}

#[test]
fn fragments_are_only_made_from_fragmentable_messages() {
  let cancel = MessageFactory::create_cancel_request(GiopVersion::V1_2, 4).unwrap();
  assert!(matches!(
    fragment_from(&cancel),
    Err(GiopError::FragmentationDisallowed { .. })
  ));

  let locate_1_1 = MessageFactory::create_locate_request(GiopVersion::V1_1, 4, b"k").unwrap();
  assert!(matches!(
    fragment_from(&locate_1_1),
    Err(GiopError::FragmentationDisallowed { .. })
  ));

  let reply_1_0 =
    MessageFactory::create_reply(GiopVersion::V1_0, 4, ReplyOutcome::NoException, Vec::new())
      .unwrap();
  assert!(fragment_from(&reply_1_0).is_err());

  let locate_1_2 = MessageFactory::create_locate_request(GiopVersion::V1_2, 4, b"k").unwrap();
  let fragment = fragment_from(&locate_1_2).unwrap();
  assert_eq!(fragment.kind, MessageKind::Fragment);
  assert_eq!(fragment.request_id(), Some(4));
  assert!(!fragment.more_fragments_to_follow());

  // a fragment of a fragment keeps the request id
  assert_eq!(fragment_from(&fragment).unwrap().request_id(), Some(4));
}

#[test]
fn small_messages_are_not_split() {
  let config = CodecConfig::builder().fragment_size(100).build().unwrap();
  assert_eq!(config.fragment_size(), 96);

  let close = MessageFactory::create_close_connection(GiopVersion::V1_2).unwrap();
  let encoded = close.encode(&[]).unwrap();
  let pieces = split_into_fragments(&close, &encoded, config.fragment_size()).unwrap();
  assert_eq!(pieces, vec![encoded]);
}
