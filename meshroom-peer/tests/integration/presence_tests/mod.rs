mod test_join_sent_once;
mod test_outbound_waits_for_identity;
mod test_remove_peer;
