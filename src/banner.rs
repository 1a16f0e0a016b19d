pub const BANNER: &str = "
 _         _          _ _     _
| |_ _   _| |__   ___| (_)___| |_
| __| | | | '_ \\ / _ \\ | / __| __|
| |_| |_| | |_) |  __/ | \\__ \\ |_
 \\__|\\__,_|_.__/ \\___|_|_|___/\\__|
";
