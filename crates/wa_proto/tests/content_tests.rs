//! End-to-end checks of the content model through its public API.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;
use wa_proto::collaborator::{upload_fn, UploadRequest, UploadedMedia};
use wa_proto::content::{
    AudioContent, Button, ButtonReplyInfo, ButtonReplyType, ButtonsContent, ContactMessage,
    GroupInviteInfo, ImageContent, ListContent, ListResponseMessage, ListRow, ListSection,
    LocationMessage, PinType, PollMessageOptions, ProductContent, SendableProduct, StickerContent,
    TemplateButton, TemplateButtonAction, TemplateContent, TextContent, VideoContent,
};
use wa_proto::options::{MessageRelayOptions, MinimalRelayOptions};
use wa_proto::{
    AnyMessageContent, AnyRegularMessageContent, Capability, CollaboratorError, ContentError,
    ContextInfo, MediaDecryptionKeyInfo, MediaType, MediaUpload, Merge, MessageGenerationOptions,
    MessageKey, MiscMessageGenerationOptions, WebMessageInfo,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn chat_key(id: &str) -> MessageKey {
    MessageKey::new("120363000000000000@g.us", false, id).with_participant("49170000000@s.whatsapp.net")
}

#[test]
fn text_with_mentions_carries_both_unmodified() {
    init_tracing();
    let content = AnyRegularMessageContent::from_value(json!({
        "text": { "text": "hello", "mentions": ["123@s.whatsapp.net"] }
    }))
    .unwrap();

    assert_eq!(content.tag(), "text");
    assert_eq!(content.mentions(), ["123@s.whatsapp.net".to_string()]);
    assert!(content.media().is_none());
    assert!(content.media_type().is_none());
    match &content {
        AnyRegularMessageContent::Text(TextContent { text, .. }) => assert_eq!(text, "hello"),
        other => panic!("unexpected variant {}", other.tag()),
    }
}

#[test]
fn image_by_url_without_caption_is_allowed() {
    let content = AnyRegularMessageContent::from_value(json!({
        "image": { "image": { "url": "https://mmg.whatsapp.net/d/f/abc.enc" } }
    }))
    .unwrap();

    let AnyRegularMessageContent::Image(image) = &content else {
        panic!("expected image");
    };
    assert!(image.caption.is_none());
    assert!(image.dimensions.is_empty());
    assert_eq!(content.media_type(), Some(MediaType::Image));
    assert_eq!(content.media().and_then(MediaUpload::as_url), Some("https://mmg.whatsapp.net/d/f/abc.enc"));

    let sized = content.with_dimensions(1280, 720).unwrap();
    assert_eq!(sized.dimensions().and_then(|d| d.width), Some(1280));
}

#[test]
fn two_tags_are_a_shape_violation() {
    let err = AnyRegularMessageContent::from_value(json!({
        "text": { "text": "hi" },
        "image": { "image": { "url": "https://example.com/a.jpg" } }
    }))
    .unwrap_err();
    assert!(err.is_shape_violation());

    let err = AnyRegularMessageContent::from_value(json!({})).unwrap_err();
    assert!(matches!(err, ContentError::Shape { .. }));

    let err = AnyRegularMessageContent::from_value(json!({ "carousel": {} })).unwrap_err();
    assert!(matches!(err, ContentError::UnknownTag(_)));
}

#[test]
fn media_with_two_sources_is_rejected_when_parsed() {
    let err = AnyRegularMessageContent::from_value(json!({
        "image": { "image": { "url": "https://example.com/a.jpg", "buffer": "aGk=" } }
    }))
    .unwrap_err();
    assert!(err.is_field_constraint());

    let err = AnyRegularMessageContent::from_value(json!({ "video": { "video": {} } })).unwrap_err();
    assert!(err.is_field_constraint());

    let err = AnyRegularMessageContent::from_value(json!({ "audio": { "audio": { "url": "" } } })).unwrap_err();
    assert!(err.is_field_constraint());
}

#[test]
fn pin_duration_is_checked_not_clamped() {
    let err = AnyRegularMessageContent::pin(chat_key("P1"), PinType::PinForAll, Some(3600)).unwrap_err();
    assert!(err.is_field_constraint());

    let pin = AnyRegularMessageContent::pin(chat_key("P1"), PinType::PinForAll, Some(604_800)).unwrap();
    let v = serde_json::to_value(&pin).unwrap();
    assert_eq!(v["pin"]["time"], json!(604_800));
    assert_eq!(v["pin"]["type"], json!("PIN_FOR_ALL"));

    let bad = json!({ "pin": { "key": v["pin"]["key"].clone(), "type": "PIN_FOR_ALL", "time": 3600 } });
    assert!(AnyRegularMessageContent::from_value(bad).unwrap_err().is_field_constraint());

    let unpinned = json!({ "pin": { "key": v["pin"]["key"].clone(), "type": "PIN_FOR_ALL" } });
    assert!(AnyRegularMessageContent::from_value(unpinned).unwrap_err().is_field_constraint());
}

#[test]
fn serialised_variants_round_trip() {
    let samples = vec![
        AnyRegularMessageContent::Text(
            TextContent::new("look").mentions(["a@s.whatsapp.net"]).edit(chat_key("E1")),
        ),
        AnyRegularMessageContent::Image(
            ImageContent::new(MediaUpload::buffer(Bytes::from_static(b"\xff\xd8\xff")))
                .caption("cat")
                .dimensions(640, 480)
                .view_once(),
        ),
        AnyRegularMessageContent::document(MediaUpload::url("https://example.com/r.pdf").unwrap(), "application/pdf"),
        AnyRegularMessageContent::poll(PollMessageOptions::new("Lunch?", ["pizza", "sushi"]).selectable_count(1))
            .unwrap(),
        AnyRegularMessageContent::contacts(
            Some("Ops".into()),
            vec![ContactMessage { display_name: None, vcard: "BEGIN:VCARD\nEND:VCARD".into() }],
        )
        .unwrap(),
        AnyRegularMessageContent::location(LocationMessage::new(52.52, 13.405)).unwrap(),
        AnyRegularMessageContent::react(chat_key("R1"), "🔥"),
        AnyRegularMessageContent::button_reply(
            ButtonReplyInfo { display_text: "Yes".into(), id: "yes".into(), index: 0 },
            ButtonReplyType::Plain,
        ),
        AnyRegularMessageContent::list_reply(ListResponseMessage::single_select("Menu", "row-2")),
        AnyRegularMessageContent::Video(
            VideoContent::new(MediaUpload::url("https://example.com/v.mp4").unwrap())
                .caption("clip")
                .gif_playback()
                .mimetype("video/mp4")
                .jpeg_thumbnail("/9j/4AAQ")
                .dimensions(320, 240),
        ),
        AnyRegularMessageContent::Audio(
            AudioContent::new(MediaUpload::buffer(Bytes::from_static(b"OggS"))).ptt().seconds(7),
        ),
        AnyRegularMessageContent::Sticker(
            StickerContent::new(MediaUpload::url("https://example.com/s.webp").unwrap())
                .animated()
                .mimetype("image/webp")
                .dimensions(512, 512),
        ),
        AnyRegularMessageContent::pin(chat_key("P2"), PinType::PinForAll, None).unwrap(),
        AnyRegularMessageContent::pin(chat_key("P3"), PinType::UnpinForAll, None).unwrap(),
        AnyRegularMessageContent::group_invite(GroupInviteInfo {
            invite_code: "AbCdEf123".into(),
            invite_expiration: 1_700_000_000,
            text: "Join us".into(),
            jid: "120363000000000000@g.us".into(),
            subject: "Ops".into(),
        })
        .unwrap(),
        AnyRegularMessageContent::product(ProductContent {
            product: SendableProduct {
                product_image: MediaUpload::url("https://example.com/p.jpg").unwrap(),
                product_id: "sku-1".into(),
                title: "Mug".into(),
                description: None,
                currency_code: Some("EUR".into()),
                price_amount_1000: Some(9_990),
                sale_price_amount_1000: None,
                retailer_id: None,
                url: None,
                product_image_count: 1,
                first_image_id: None,
            },
            business_owner_jid: Some("49170000000@s.whatsapp.net".into()),
            body: None,
            footer: Some("shop".into()),
        })
        .unwrap(),
        AnyRegularMessageContent::request_phone_number(),
        AnyRegularMessageContent::buttons(
            ButtonsContent::new("Pick one", vec![Button::new("a", "A"), Button::new("b", "B")]).footer("f"),
        )
        .unwrap(),
        AnyRegularMessageContent::template(TemplateContent {
            text: "Links".into(),
            footer: None,
            template_buttons: vec![
                TemplateButton {
                    index: 1,
                    action: TemplateButtonAction::UrlButton {
                        display_text: "Site".into(),
                        url: "https://example.com".into(),
                    },
                },
                TemplateButton {
                    index: 2,
                    action: TemplateButtonAction::CallButton {
                        display_text: "Call".into(),
                        phone_number: "+4917000000".into(),
                    },
                },
            ],
            mentions: vec![],
            context_info: None,
        })
        .unwrap(),
        AnyRegularMessageContent::list(ListContent {
            text: "Menu".into(),
            button_text: "Open".into(),
            title: Some("Today".into()),
            footer: None,
            sections: vec![ListSection {
                title: "Mains".into(),
                rows: vec![ListRow { title: "Soup".into(), row_id: "r1".into(), description: None }],
            }],
            mentions: vec![],
            context_info: None,
        })
        .unwrap(),
        AnyRegularMessageContent::share_phone_number(),
    ];

    let mut tags: Vec<&str> = samples.iter().map(|c| c.tag()).collect();
    tags.sort_unstable();
    tags.dedup();
    assert_eq!(tags.len(), wa_proto::content::REGULAR_TAGS.len());

    for original in samples {
        let v = serde_json::to_value(&original).unwrap();
        let back = AnyRegularMessageContent::from_value(v).unwrap();
        assert_eq!(back.tag(), original.tag());
        assert_eq!(back, original);
    }
}

#[test]
fn template_buttons_serialise_camel_case() {
    let template = AnyRegularMessageContent::template(TemplateContent {
        text: "t".into(),
        footer: None,
        template_buttons: vec![TemplateButton {
            index: 0,
            action: TemplateButtonAction::QuickReplyButton { display_text: "Ok".into(), id: "ok".into() },
        }],
        mentions: vec![],
        context_info: None,
    })
    .unwrap();
    let v = serde_json::to_value(&template).unwrap();
    assert_eq!(
        v["template"]["templateButtons"][0],
        json!({ "index": 0, "quickReplyButton": { "displayText": "Ok", "id": "ok" } })
    );
}

#[test]
fn unsupported_loose_fields_are_not_dropped() {
    let err = AnyRegularMessageContent::from_value(json!({
        "audio": { "audio": { "url": "https://example.com/a.ogg" }, "contextInfo": {} }
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        ContentError::UnsupportedCapability { tag: "audio", capability: Capability::Context }
    ));

    let err = AnyRegularMessageContent::from_value(json!({
        "video": { "video": { "url": "https://example.com/v.mp4" }, "ptt": true }
    }))
    .unwrap_err();
    assert!(err.is_shape_violation());
}

#[test]
fn stream_sources_refuse_to_serialise() {
    let content = AnyRegularMessageContent::audio(MediaUpload::stream(std::io::Cursor::new(vec![0u8; 4])));
    assert!(serde_json::to_value(&content).is_err());
}

#[test]
fn capability_mismatch_is_reported_not_dropped() {
    let location = AnyRegularMessageContent::location(LocationMessage::new(0.0, 0.0)).unwrap();
    assert!(location.capabilities().is_empty());
    let err = location.with_context(ContextInfo::default()).unwrap_err();
    assert!(matches!(
        err,
        ContentError::UnsupportedCapability { tag: "location", capability: Capability::Context }
    ));
}

#[test]
fn reply_context_quotes_stored_message() {
    let quoted = WebMessageInfo::new(chat_key("Q1")).with_message(AnyRegularMessageContent::text("original"));
    let reply = AnyRegularMessageContent::text("answer")
        .with_context(ContextInfo::reply_to(&quoted, "me@s.whatsapp.net"))
        .unwrap();
    let ctx = reply.context_info().unwrap();
    assert_eq!(ctx.stanza_id.as_deref(), Some("Q1"));
    assert_eq!(ctx.participant.as_deref(), Some("49170000000@s.whatsapp.net"));
    assert_eq!(ctx.quoted_message.as_deref(), Some(&AnyRegularMessageContent::text("original")));
}

#[test]
fn disappearing_and_delete_are_actions() {
    let on = AnyMessageContent::from_value(json!({ "disappearingMessagesInChat": true })).unwrap();
    match on {
        AnyMessageContent::Action(wa_proto::MessageAction::DisappearingMessagesInChat(mode)) => {
            assert_eq!(mode.as_seconds(), 604_800)
        }
        other => panic!("unexpected {}", other.tag()),
    }

    let regular = AnyMessageContent::from_value(json!({ "text": { "text": "plain" } })).unwrap();
    assert!(regular.as_regular().is_some());
}

#[test]
fn message_keys_ignore_aliases() {
    let a = MessageKey::new("1@s.whatsapp.net", true, "X")
        .with_sender_aliases(Some("99@lid".into()), Some("1@s.whatsapp.net".into()));
    let b = MessageKey::new("1@s.whatsapp.net", true, "X");
    assert_eq!(a, b);
    let mut set = std::collections::HashSet::new();
    set.insert(a);
    assert!(set.contains(&b));
}

#[test]
fn key_info_lengths_and_derivation() {
    assert!(MediaDecryptionKeyInfo::new(&[0u8; 15], &[0u8; 32], None)
        .unwrap_err()
        .is_field_constraint());
    assert!(MediaDecryptionKeyInfo::new(&[0u8; 16], &[0u8; 32], None).is_ok());

    let media_key: Vec<u8> = (0u8..32).collect();
    let image = MediaDecryptionKeyInfo::derive(&media_key, MediaType::Image).unwrap();
    assert_eq!(hex::encode(image.iv()), "aa6a127218397cbd2383e4ccf7176a79");
    let audio = MediaDecryptionKeyInfo::derive(&media_key, MediaType::Audio).unwrap();
    assert_ne!(image.cipher_key(), audio.cipher_key());
}

#[test]
fn option_layers_compose() {
    let relay = MessageRelayOptions {
        minimal: MinimalRelayOptions { message_id: Some("ID-1".into()), ..Default::default() },
        ..Default::default()
    };
    let misc = MiscMessageGenerationOptions {
        minimal: MinimalRelayOptions {
            message_id: Some("ID-2".into()),
            use_cached_group_metadata: Some(true),
        },
        ..Default::default()
    };
    let resolved = relay.clone().apply_misc(&misc);
    assert_eq!(resolved.minimal.message_id.as_deref(), Some("ID-1"));
    assert_eq!(resolved.minimal.use_cached_group_metadata, Some(true));

    let x = MessageRelayOptions { use_user_devices_cache: Some(false), ..Default::default() };
    let y = MessageRelayOptions { status_jid_list: vec!["s@s.whatsapp.net".into()], ..Default::default() };
    assert_eq!(
        relay.clone().merge(x.clone()).merge(y.clone()),
        relay.merge(x.merge(y))
    );
}

#[tokio::test]
async fn generation_options_hand_out_the_uploader() {
    init_tracing();
    let uploader = upload_fn(|_path: PathBuf, req: UploadRequest| async move {
        if req.timeout_ms == Some(1) {
            return Err(CollaboratorError::TimedOut { timeout_ms: 1 });
        }
        Ok(UploadedMedia {
            media_url: "https://mmg.whatsapp.net/o1/v/t62".into(),
            direct_path: "/o1/v/t62".into(),
        })
    });
    let opts = MessageGenerationOptions::new(Arc::new(uploader), "me@s.whatsapp.net").with_misc(
        MiscMessageGenerationOptions { media_upload_timeout_ms: Some(30_000), ..Default::default() },
    );
    assert_eq!(opts.user_jid(), "me@s.whatsapp.net");
    assert_eq!(opts.upload_timeout_ms(), Some(30_000));

    let media = opts.resolved_media();
    let uploaded = media
        .uploader()
        .unwrap()
        .upload(
            &PathBuf::from("/tmp/enc"),
            UploadRequest {
                file_enc_sha256_b64: wa_crypto::hash::file_enc_sha256_b64(b"abc"),
                media_type: MediaType::Image,
                timeout_ms: media.media_upload_timeout_ms,
            },
        )
        .await
        .unwrap();
    assert_eq!(uploaded.direct_path, "/o1/v/t62");

    let err = media
        .uploader()
        .unwrap()
        .upload(
            &PathBuf::from("/tmp/enc"),
            UploadRequest { file_enc_sha256_b64: String::new(), media_type: MediaType::Image, timeout_ms: Some(1) },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CollaboratorError::TimedOut { .. }));
}
